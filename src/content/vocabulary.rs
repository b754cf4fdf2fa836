//! Required-vocabulary check for authored lessons.
//!
//! Unlike the enhancer, this check rejects: content missing any verb
//! required for its grade band fails with `MissingVocabulary`.

use serde_json::Value;

use crate::content::Catalog;
use crate::error::{LecternError, Result};

/// Fail if `content` lacks any verb required for `grade`.
///
/// Matching is a lower-cased substring test. Grades without a band pass.
pub fn validate_required_vocabulary(catalog: &Catalog, content: &str, grade: &str) -> Result<()> {
    let lowered = content.to_lowercase();
    let missing: Vec<String> = catalog
        .required_verbs(grade)
        .iter()
        .filter(|verb| !lowered.contains(&verb.to_lowercase()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!(grade, missing = ?missing, "lesson content missing required verbs");
        Err(LecternError::missing_vocabulary(grade, missing))
    }
}

/// All string content of a lesson document, space separated.
pub fn lesson_text(lesson: &Value) -> String {
    let mut parts = Vec::new();
    collect_strings(lesson, &mut parts);
    parts.join(" ")
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(text) => out.push(text),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(obj) => obj.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}
