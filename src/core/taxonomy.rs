//! Bloom's taxonomy levels and the per-lesson level histogram.

use serde::{Deserialize, Serialize};

/// One of the six cognitive levels, plus `Unknown` for unclassifiable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyLevel {
    Remembering,
    Understanding,
    Applying,
    Analyzing,
    Evaluating,
    Creating,
    Unknown,
}

impl TaxonomyLevel {
    /// The six known levels in ascending cognitive order.
    pub const KNOWN: [TaxonomyLevel; 6] = [
        TaxonomyLevel::Remembering,
        TaxonomyLevel::Understanding,
        TaxonomyLevel::Applying,
        TaxonomyLevel::Analyzing,
        TaxonomyLevel::Evaluating,
        TaxonomyLevel::Creating,
    ];

    /// Lower-case label used in prompts and stored documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyLevel::Remembering => "remembering",
            TaxonomyLevel::Understanding => "understanding",
            TaxonomyLevel::Applying => "applying",
            TaxonomyLevel::Analyzing => "analyzing",
            TaxonomyLevel::Evaluating => "evaluating",
            TaxonomyLevel::Creating => "creating",
            TaxonomyLevel::Unknown => "unknown",
        }
    }

    /// Parse one of the six known labels (case-insensitive, surrounding
    /// whitespace ignored). Anything else, including "unknown", is `None`.
    pub fn parse_known(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        Self::KNOWN
            .iter()
            .copied()
            .find(|level| level.as_str() == normalized)
    }

    /// Normalize a label into a level, mapping unrecognized labels to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        Self::parse_known(label).unwrap_or(TaxonomyLevel::Unknown)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TaxonomyLevel::Unknown)
    }
}

impl std::fmt::Display for TaxonomyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of interactions per taxonomy level.
///
/// All seven buckets are always present in the serialized form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyHistogram {
    pub remembering: u64,
    pub understanding: u64,
    pub applying: u64,
    pub analyzing: u64,
    pub evaluating: u64,
    pub creating: u64,
    pub unknown: u64,
}

impl TaxonomyHistogram {
    /// Build a histogram from a sequence of levels.
    pub fn from_levels(levels: impl IntoIterator<Item = TaxonomyLevel>) -> Self {
        let mut histogram = Self::default();
        for level in levels {
            histogram.increment(level);
        }
        histogram
    }

    /// Increment the bucket matching `level`.
    pub fn increment(&mut self, level: TaxonomyLevel) {
        *self.bucket_mut(level) += 1;
    }

    /// Count for a single level.
    pub fn get(&self, level: TaxonomyLevel) -> u64 {
        match level {
            TaxonomyLevel::Remembering => self.remembering,
            TaxonomyLevel::Understanding => self.understanding,
            TaxonomyLevel::Applying => self.applying,
            TaxonomyLevel::Analyzing => self.analyzing,
            TaxonomyLevel::Evaluating => self.evaluating,
            TaxonomyLevel::Creating => self.creating,
            TaxonomyLevel::Unknown => self.unknown,
        }
    }

    /// Sum across all buckets.
    pub fn total(&self) -> u64 {
        self.remembering
            + self.understanding
            + self.applying
            + self.analyzing
            + self.evaluating
            + self.creating
            + self.unknown
    }

    fn bucket_mut(&mut self, level: TaxonomyLevel) -> &mut u64 {
        match level {
            TaxonomyLevel::Remembering => &mut self.remembering,
            TaxonomyLevel::Understanding => &mut self.understanding,
            TaxonomyLevel::Applying => &mut self.applying,
            TaxonomyLevel::Analyzing => &mut self.analyzing,
            TaxonomyLevel::Evaluating => &mut self.evaluating,
            TaxonomyLevel::Creating => &mut self.creating,
            TaxonomyLevel::Unknown => &mut self.unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_is_case_insensitive() {
        assert_eq!(
            TaxonomyLevel::parse_known("  Applying "),
            Some(TaxonomyLevel::Applying)
        );
        assert_eq!(
            TaxonomyLevel::parse_known("CREATING"),
            Some(TaxonomyLevel::Creating)
        );
    }

    #[test]
    fn test_parse_known_rejects_unknown_and_garbage() {
        assert_eq!(TaxonomyLevel::parse_known("unknown"), None);
        assert_eq!(TaxonomyLevel::parse_known("synthesis"), None);
        assert_eq!(TaxonomyLevel::parse_known(""), None);
    }

    #[test]
    fn test_from_label_defaults_to_unknown() {
        assert_eq!(
            TaxonomyLevel::from_label("Unable to classify"),
            TaxonomyLevel::Unknown
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&TaxonomyLevel::Analyzing).unwrap();
        assert_eq!(json, "\"analyzing\"");
    }

    #[test]
    fn test_histogram_serializes_all_buckets() {
        let value = serde_json::to_value(TaxonomyHistogram::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        assert_eq!(obj["unknown"], 0);
    }

    #[test]
    fn test_histogram_from_levels() {
        let histogram = TaxonomyHistogram::from_levels([
            TaxonomyLevel::Understanding,
            TaxonomyLevel::Understanding,
            TaxonomyLevel::Unknown,
        ]);
        assert_eq!(histogram.get(TaxonomyLevel::Understanding), 2);
        assert_eq!(histogram.get(TaxonomyLevel::Unknown), 1);
        assert_eq!(histogram.total(), 3);
    }
}
