//! Fallback classifier wrapper.
//!
//! Tries a primary classifier first and answers from a secondary one if the
//! primary fails.

use tracing::warn;

use crate::classify::traits::{Classification, ClassificationSource, TaxonomyClassifier};
use crate::error::Result;

/// A classifier wrapper that falls back to a secondary classifier on error.
///
/// Pairing the delegated classifier with the heuristic keeps interaction
/// recording available while the text service is down.
pub struct FallbackClassifier {
    /// Primary classifier (tried first).
    primary: Box<dyn TaxonomyClassifier>,
    /// Fallback classifier (used if primary fails).
    fallback: Box<dyn TaxonomyClassifier>,
}

impl FallbackClassifier {
    pub fn new(primary: Box<dyn TaxonomyClassifier>, fallback: Box<dyn TaxonomyClassifier>) -> Self {
        Self { primary, fallback }
    }

    pub fn primary_name(&self) -> &'static str {
        self.primary.name()
    }

    pub fn fallback_name(&self) -> &'static str {
        self.fallback.name()
    }
}

impl TaxonomyClassifier for FallbackClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        match self.primary.classify(text) {
            Ok(classification) => Ok(classification),
            Err(err) => {
                warn!(
                    "Primary classifier '{}' failed ({}), falling back to '{}'",
                    self.primary.name(),
                    err,
                    self.fallback.name()
                );
                let mut classification = self.fallback.classify(text)?;
                classification.source = ClassificationSource::Fallback;
                Ok(classification)
            }
        }
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{DelegatedClassifier, HeuristicClassifier};
    use crate::content::Catalog;
    use crate::core::TaxonomyLevel;
    use crate::generation::testing::ScriptedGenerator;
    use std::sync::Arc;
    use std::time::Duration;

    fn wrapper(generator: ScriptedGenerator) -> FallbackClassifier {
        FallbackClassifier::new(
            Box::new(DelegatedClassifier::new(
                Arc::new(generator),
                Duration::from_secs(30),
            )),
            Box::new(HeuristicClassifier::new(Arc::new(Catalog::default()))),
        )
    }

    #[test]
    fn test_primary_answer_used() {
        let classifier = wrapper(ScriptedGenerator::always("Level: creating"));
        let result = classifier.classify("Explain why plants need sunlight").unwrap();
        assert_eq!(result.level, TaxonomyLevel::Creating);
        assert_eq!(result.source, ClassificationSource::Delegated);
    }

    #[test]
    fn test_falls_back_on_failure() {
        let classifier = wrapper(ScriptedGenerator::failing("connection refused"));
        let result = classifier.classify("Explain why plants need sunlight").unwrap();
        assert_eq!(result.level, TaxonomyLevel::Understanding);
        assert_eq!(result.source, ClassificationSource::Fallback);
    }

    #[test]
    fn test_names() {
        let classifier = wrapper(ScriptedGenerator::always("x"));
        assert_eq!(classifier.name(), "delegated");
        assert_eq!(classifier.primary_name(), "delegated");
        assert_eq!(classifier.fallback_name(), "heuristic");
    }
}
