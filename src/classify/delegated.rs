//! Classification delegated to the text generation service.

use std::sync::Arc;
use std::time::Duration;

use crate::classify::traits::{Classification, ClassificationSource, TaxonomyClassifier};
use crate::core::TaxonomyLevel;
use crate::error::{LecternError, Result};
use crate::generation::TextGenerator;

/// Asks the text generation service for a level and a rationale.
pub struct DelegatedClassifier {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl DelegatedClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }
}

/// Build the classification prompt for `text`.
pub fn classification_prompt(text: &str) -> String {
    let levels: Vec<&str> = TaxonomyLevel::KNOWN.iter().map(|l| l.as_str()).collect();
    format!(
        "Analyze the following student interaction text:\n\n\"{}\"\n\n\
         1. Identify which Bloom's taxonomy level ({}) best applies.\n\
         2. Provide a short reason or rationale.\n\n\
         Answer in exactly this format:\nLevel: <level>\nRationale: <one sentence>\n",
        text,
        levels.join(", ")
    )
}

/// Strip markdown emphasis, bullets and heading marks from a reply line.
fn clean_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['#', '-', '>', ' '])
        .trim_matches(|c: char| c == '*' || c == '_' || c == '`')
        .trim()
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| line[prefix.len()..].trim_start_matches(['*', '_', ' ']).trim())
}

/// Normalize a label to a level: the first alphabetic word, lower-cased,
/// must be one of the six known levels.
fn normalize_label(label: &str) -> TaxonomyLevel {
    label
        .split(|c: char| !c.is_alphabetic())
        .find(|word| !word.is_empty())
        .map(TaxonomyLevel::from_label)
        .unwrap_or(TaxonomyLevel::Unknown)
}

/// Parse a generated reply into a level and an optional rationale.
///
/// A `Level:` line wins; otherwise the first non-empty line is the label.
/// Labels outside the six known levels become `Unknown`.
pub fn parse_reply(reply: &str) -> (TaxonomyLevel, Option<String>) {
    let lines: Vec<&str> = reply
        .lines()
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .collect();

    let label = lines
        .iter()
        .find_map(|line| strip_prefix_ci(line, "level:"))
        .or_else(|| lines.first().copied());

    let level = label.map(normalize_label).unwrap_or(TaxonomyLevel::Unknown);

    let rationale = lines
        .iter()
        .find_map(|line| {
            strip_prefix_ci(line, "rationale:").or_else(|| strip_prefix_ci(line, "reason:"))
        })
        .filter(|r| !r.is_empty())
        .map(|r| r.to_string());

    (level, rationale)
}

impl TaxonomyClassifier for DelegatedClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        let reply = self
            .generator
            .generate(&classification_prompt(text), self.timeout)
            .map_err(|err| LecternError::classification_unavailable(err.to_string()))?;

        let (level, rationale) = parse_reply(&reply);
        if !level.is_known() {
            tracing::debug!(reply = %crate::util::truncate_chars(&reply, 120), "unrecognized taxonomy label");
        }

        Ok(Classification {
            level,
            rationale,
            source: ClassificationSource::Delegated,
        })
    }

    fn name(&self) -> &'static str {
        "delegated"
    }
}
