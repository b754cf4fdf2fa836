//! Taxonomy classifier trait.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::TaxonomyLevel;
use crate::error::Result;

/// Which strategy produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Heuristic,
    Delegated,
    /// The delegated call failed and the heuristic answered instead.
    Fallback,
}

/// Result of classifying one piece of interaction text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub level: TaxonomyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub source: ClassificationSource,
}

impl Classification {
    pub fn new(level: TaxonomyLevel, source: ClassificationSource) -> Self {
        Self {
            level,
            rationale: None,
            source,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// Maps free text to a taxonomy level.
///
/// Implementations are interchangeable; callers pick one per deployment or
/// per call.
pub trait TaxonomyClassifier: Send + Sync {
    /// Classify `text`. Delegated implementations fail with
    /// `ClassificationUnavailable` when the text service cannot answer.
    fn classify(&self, text: &str) -> Result<Classification>;

    /// Name of this classifier for logging.
    fn name(&self) -> &'static str;
}

impl<T: TaxonomyClassifier + ?Sized> TaxonomyClassifier for Arc<T> {
    fn classify(&self, text: &str) -> Result<Classification> {
        (**self).classify(text)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
