//! Document values and the commit-time rules shared by every store.
//!
//! Documents are JSON objects addressed by slash-separated paths that
//! alternate collection and document ids (`lesson_sessions/session_1`).
//! Writes may embed [`server_timestamp`] sentinels; stores replace them with
//! the commit time before the document becomes visible.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{LecternError, Result};

/// A stored document.
pub type Document = Map<String, Value>;

/// Key of the sentinel object standing in for a server-assigned timestamp.
pub const SERVER_TIMESTAMP_KEY: &str = "$serverTimestamp";

/// A value the store replaces with its commit time.
pub fn server_timestamp() -> Value {
    let mut sentinel = Map::new();
    sentinel.insert(SERVER_TIMESTAMP_KEY.to_string(), Value::Bool(true));
    Value::Object(sentinel)
}

/// Whether `value` is a [`server_timestamp`] sentinel.
pub fn is_server_timestamp(value: &Value) -> bool {
    match value {
        Value::Object(obj) => obj.len() == 1 && obj.get(SERVER_TIMESTAMP_KEY) == Some(&Value::Bool(true)),
        _ => false,
    }
}

/// Format a commit time the way stored timestamps are written.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Replace every sentinel in `value`, at any depth, with `now`.
pub fn resolve_server_timestamps(value: &mut Value, now: DateTime<Utc>) {
    if is_server_timestamp(value) {
        *value = Value::String(format_timestamp(now));
        return;
    }
    match value {
        Value::Object(obj) => {
            for child in obj.values_mut() {
                resolve_server_timestamps(child, now);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                resolve_server_timestamps(child, now);
            }
        }
        _ => {}
    }
}

fn resolve_document(doc: &mut Document, now: DateTime<Utc>) {
    for value in doc.values_mut() {
        resolve_server_timestamps(value, now);
    }
}

/// How `set` treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace the whole document.
    #[default]
    Overwrite,
    /// Deep-merge into the existing document, preserving absent fields.
    Merge,
}

/// Deep-merge `patch` into `target`.
///
/// Nested objects merge key by key; any other value replaces the target's.
pub fn deep_merge(target: &mut Document, patch: Document) {
    for (key, incoming) in patch {
        match (target.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                deep_merge(existing, nested);
            }
            (_, incoming) => {
                target.insert(key, incoming);
            }
        }
    }
}

/// Compute the document a `set` commits.
pub fn apply_set(
    existing: Option<Document>,
    mut incoming: Document,
    mode: WriteMode,
    now: DateTime<Utc>,
) -> Document {
    resolve_document(&mut incoming, now);
    match (mode, existing) {
        (WriteMode::Merge, Some(mut current)) => {
            deep_merge(&mut current, incoming);
            current
        }
        _ => incoming,
    }
}

/// Compute the document an `update` commits: top-level fields replace.
pub fn apply_update(mut existing: Document, mut fields: Document, now: DateTime<Utc>) -> Document {
    resolve_document(&mut fields, now);
    for (key, value) in fields {
        existing.insert(key, value);
    }
    existing
}

/// Split and check a document path.
///
/// Segments must be non-empty, must not be `.` or `..`, and must not contain
/// backslashes or NUL. Document paths have an even number of segments.
pub fn document_segments(path: &str) -> Result<Vec<&str>> {
    let segments = path_segments(path)?;
    if segments.len() % 2 != 0 {
        return Err(LecternError::validation(format!(
            "invalid document path '{}': expected collection/id pairs",
            path
        )));
    }
    Ok(segments)
}

/// Split and check a collection path (odd number of segments).
pub fn collection_segments(path: &str) -> Result<Vec<&str>> {
    let segments = path_segments(path)?;
    if segments.len() % 2 != 1 {
        return Err(LecternError::validation(format!(
            "invalid collection path '{}'",
            path
        )));
    }
    Ok(segments)
}

fn path_segments(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').collect();
    for segment in &segments {
        let bad = segment.is_empty()
            || *segment == "."
            || *segment == ".."
            || segment.contains('\\')
            || segment.contains('\0');
        if bad {
            return Err(LecternError::validation(format!(
                "invalid path segment '{}' in '{}'",
                segment, path
            )));
        }
    }
    Ok(segments)
}

/// Field-equality filter for collection queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// A filter that matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a `field == value` condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

/// Serialize a record into a document.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(doc) => Ok(doc),
        other => Err(LecternError::serde(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Deserialize a stored document into a record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Short name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
