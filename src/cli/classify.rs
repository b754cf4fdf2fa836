//! Classify command for Lectern.
//!
//! Runs one piece of text through a taxonomy classifier, useful for checking
//! the heuristic vocabulary or a text generation deployment by hand.

use serde::{Deserialize, Serialize};

use crate::classify::{ClassificationSource, ClassifierSet};
use crate::config::ClassifierStrategy;
use crate::core::TaxonomyLevel;

/// Options for the classify command.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Output as JSON.
    pub json: bool,
    /// Strategy override; the configured default otherwise.
    pub strategy: Option<ClassifierStrategy>,
}

/// Output format for the classify command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyOutput {
    pub success: bool,
    pub strategy: ClassifierStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<TaxonomyLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ClassificationSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassifyOutput {
    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Classification failed ({}): {}",
                self.strategy,
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let level = self.level.unwrap_or(TaxonomyLevel::Unknown);
        let mut text = format!("Level: {} (via {})", level, self.strategy);
        if self.source == Some(ClassificationSource::Fallback) {
            text.push_str(" [fallback]");
        }
        if let Some(rationale) = &self.rationale {
            text.push_str(&format!("\nRationale: {}", rationale));
        }
        text
    }
}

/// The classify command implementation.
pub struct ClassifyCommand {
    classifiers: ClassifierSet,
}

impl ClassifyCommand {
    pub fn new(classifiers: ClassifierSet) -> Self {
        Self { classifiers }
    }

    pub fn run(&self, text: &str, options: &ClassifyOptions) -> ClassifyOutput {
        let strategy = options
            .strategy
            .unwrap_or_else(|| self.classifiers.default_strategy());
        match self.classifiers.select(Some(strategy)).classify(text) {
            Ok(classification) => ClassifyOutput {
                success: true,
                strategy,
                level: Some(classification.level),
                rationale: classification.rationale,
                source: Some(classification.source),
                error: None,
            },
            Err(e) => ClassifyOutput {
                success: false,
                strategy,
                level: None,
                rationale: None,
                source: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Catalog;
    use crate::generation::testing::ScriptedGenerator;
    use std::sync::Arc;
    use std::time::Duration;

    fn command(generator: ScriptedGenerator) -> ClassifyCommand {
        ClassifyCommand::new(ClassifierSet::new(
            ClassifierStrategy::Delegated,
            Arc::new(Catalog::default()),
            Arc::new(generator),
            Duration::from_secs(5),
        ))
    }

    #[test]
    fn test_heuristic_override() {
        let output = command(ScriptedGenerator::failing("down")).run(
            "Explain why leaves change colour",
            &ClassifyOptions {
                strategy: Some(ClassifierStrategy::Heuristic),
                ..Default::default()
            },
        );
        assert!(output.success);
        assert_eq!(output.level, Some(TaxonomyLevel::Understanding));
        assert!(output.format_text().starts_with("Level: understanding (via heuristic)"));
    }

    #[test]
    fn test_delegated_failure_reported() {
        let output = command(ScriptedGenerator::failing("connection refused"))
            .run("Explain it", &ClassifyOptions::default());
        assert!(!output.success);
        assert_eq!(output.strategy, ClassifierStrategy::Delegated);
        assert!(output.format_text().contains("connection refused"));
    }

    #[test]
    fn test_fallback_marked() {
        let output = command(ScriptedGenerator::failing("down")).run(
            "Design a new experiment",
            &ClassifyOptions {
                strategy: Some(ClassifierStrategy::DelegatedWithFallback),
                ..Default::default()
            },
        );
        assert!(output.success);
        assert_eq!(output.source, Some(ClassificationSource::Fallback));
        assert!(output.format_text().contains("[fallback]"));
    }

    #[test]
    fn test_json_shape() {
        let output = command(ScriptedGenerator::always("Level: Applying\nRationale: used a formula"))
            .run("Solve for x", &ClassifyOptions::default());
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["strategy"], "delegated");
        assert_eq!(json["rationale"], "used a formula");
        assert!(json.get("error").is_none());
    }
}
