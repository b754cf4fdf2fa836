//! Taxonomy classification strategies.
//!
//! Three interchangeable strategies sit behind [`TaxonomyClassifier`]:
//! the keyword heuristic, the delegated text-generation call, and the
//! delegated call with heuristic fallback. [`ClassifierSet`] holds one of
//! each so a deployment default can be overridden per call.

pub mod delegated;
pub mod fallback;
pub mod heuristic;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use delegated::{classification_prompt, parse_reply, DelegatedClassifier};
pub use fallback::FallbackClassifier;
pub use heuristic::HeuristicClassifier;
pub use traits::{Classification, ClassificationSource, TaxonomyClassifier};

use crate::config::ClassifierStrategy;
use crate::content::Catalog;
use crate::generation::TextGenerator;

/// One classifier per strategy plus the deployment default.
#[derive(Clone)]
pub struct ClassifierSet {
    default_strategy: ClassifierStrategy,
    heuristic: Arc<dyn TaxonomyClassifier>,
    delegated: Arc<dyn TaxonomyClassifier>,
    delegated_with_fallback: Arc<dyn TaxonomyClassifier>,
}

impl ClassifierSet {
    pub fn new(
        default_strategy: ClassifierStrategy,
        catalog: Arc<Catalog>,
        generator: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            default_strategy,
            heuristic: Arc::new(HeuristicClassifier::new(catalog.clone())),
            delegated: Arc::new(DelegatedClassifier::new(generator.clone(), timeout)),
            delegated_with_fallback: Arc::new(FallbackClassifier::new(
                Box::new(DelegatedClassifier::new(generator, timeout)),
                Box::new(HeuristicClassifier::new(catalog)),
            )),
        }
    }

    pub fn default_strategy(&self) -> ClassifierStrategy {
        self.default_strategy
    }

    /// The classifier for `strategy`, or the deployment default.
    pub fn select(&self, strategy: Option<ClassifierStrategy>) -> Arc<dyn TaxonomyClassifier> {
        match strategy.unwrap_or(self.default_strategy) {
            ClassifierStrategy::Heuristic => self.heuristic.clone(),
            ClassifierStrategy::Delegated => self.delegated.clone(),
            ClassifierStrategy::DelegatedWithFallback => self.delegated_with_fallback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaxonomyLevel;
    use crate::error::LecternError;
    use crate::generation::testing::ScriptedGenerator;

    fn set(default: ClassifierStrategy) -> ClassifierSet {
        ClassifierSet::new(
            default,
            Arc::new(Catalog::default()),
            Arc::new(ScriptedGenerator::failing("down")),
            Duration::from_secs(30),
        )
    }

    #[test]
    fn test_default_strategy_selected() {
        let classifiers = set(ClassifierStrategy::Heuristic);
        let result = classifiers
            .select(None)
            .classify("Explain why plants need sunlight")
            .unwrap();
        assert_eq!(result.level, TaxonomyLevel::Understanding);
    }

    #[test]
    fn test_per_call_override() {
        let classifiers = set(ClassifierStrategy::Heuristic);
        let err = classifiers
            .select(Some(ClassifierStrategy::Delegated))
            .classify("Explain")
            .unwrap_err();
        assert!(matches!(err, LecternError::ClassificationUnavailable { .. }));

        let result = classifiers
            .select(Some(ClassifierStrategy::DelegatedWithFallback))
            .classify("Explain")
            .unwrap();
        assert_eq!(result.source, ClassificationSource::Fallback);
    }
}
