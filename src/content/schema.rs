//! Structural validation of authored lesson documents.
//!
//! Violations are collected and returned rather than raised, so callers can
//! report every problem at once.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::DifficultyLevel;
use crate::storage::document::json_type_name;

/// Minimum number of key concepts in a valid lesson.
pub const MIN_KEY_CONCEPTS: usize = 3;

/// Allowed `type` values of entries in `interactiveElements`.
pub const INTERACTIVE_ELEMENT_TYPES: [&str; 4] = ["graph", "animation", "flashcard", "text"];

/// One schema violation, located by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Clone, Copy)]
enum Kind {
    String,
    Number,
    Array,
    Object,
}

impl Kind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::String => value.is_string(),
            Kind::Number => value.is_number(),
            Kind::Array => value.is_array(),
            Kind::Object => value.is_object(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

const SECTION_FIELDS: [(&str, Kind); 4] = [
    ("title", Kind::String),
    ("duration", Kind::Number),
    ("content", Kind::String),
    ("interactive_element", Kind::String),
];

const QUIZ_FIELDS: [(&str, Kind); 3] = [
    ("question", Kind::String),
    ("options", Kind::Array),
    ("answer", Kind::String),
];

const ELEMENT_FIELDS: [(&str, Kind); 4] = [
    ("title", Kind::String),
    ("data", Kind::Array),
    ("animationConfig", Kind::Object),
    ("flashcards", Kind::Array),
];

#[derive(Default)]
struct Checker {
    violations: Vec<SchemaViolation>,
}

impl Checker {
    fn report(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(SchemaViolation::new(path, message));
    }

    fn expect_kind(&mut self, path: &str, value: &Value, kind: Kind) -> bool {
        if kind.accepts(value) {
            true
        } else {
            self.report(
                path,
                format!("expected {}, found {}", kind.name(), json_type_name(value)),
            );
            false
        }
    }

    /// Check optional typed properties of one object.
    fn fields(&mut self, path: &str, obj: &Map<String, Value>, fields: &[(&str, Kind)]) {
        for (name, kind) in fields {
            if let Some(value) = obj.get(*name) {
                self.expect_kind(&format!("{}/{}", path, name), value, *kind);
            }
        }
    }

    /// Check an optional array of objects, each with typed properties.
    fn object_array(
        &mut self,
        root: &Map<String, Value>,
        key: &str,
        fields: &[(&str, Kind)],
        extra: impl Fn(&mut Self, &str, &Map<String, Value>),
    ) {
        let Some(value) = root.get(key) else {
            return;
        };
        let path = format!("/{}", key);
        let Some(items) = value.as_array() else {
            self.expect_kind(&path, value, Kind::Array);
            return;
        };
        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{}/{}", path, index);
            if let Some(obj) = item.as_object() {
                self.fields(&item_path, obj, fields);
                extra(self, &item_path, obj);
            } else {
                self.expect_kind(&item_path, item, Kind::Object);
            }
        }
    }
}

/// Validate an authored lesson document.
///
/// Requires a string `title`, at least three string `key_concepts` and a
/// `sections` array. Sections, quizzes, metadata and interactive elements
/// are type-checked when present.
pub fn validate_schema(lesson: &Value) -> Result<(), Vec<SchemaViolation>> {
    let mut checker = Checker::default();
    let Some(root) = lesson.as_object() else {
        checker.report("", format!("expected object, found {}", json_type_name(lesson)));
        return Err(checker.violations);
    };

    match root.get("title") {
        Some(title) => {
            checker.expect_kind("/title", title, Kind::String);
        }
        None => checker.report("/title", "required property missing"),
    }

    match root.get("key_concepts") {
        Some(Value::Array(concepts)) => {
            for (index, concept) in concepts.iter().enumerate() {
                checker.expect_kind(&format!("/key_concepts/{}", index), concept, Kind::String);
            }
            if concepts.len() < MIN_KEY_CONCEPTS {
                checker.report(
                    "/key_concepts",
                    format!(
                        "expected at least {} items, found {}",
                        MIN_KEY_CONCEPTS,
                        concepts.len()
                    ),
                );
            }
        }
        Some(other) => {
            checker.expect_kind("/key_concepts", other, Kind::Array);
        }
        None => checker.report("/key_concepts", "required property missing"),
    }

    if !root.contains_key("sections") {
        checker.report("/sections", "required property missing");
    }
    checker.object_array(root, "sections", &SECTION_FIELDS, |_, _, _| {});
    checker.object_array(root, "quizzes", &QUIZ_FIELDS, |_, _, _| {});
    checker.object_array(root, "interactiveElements", &ELEMENT_FIELDS, |checker, path, obj| {
        if let Some(kind) = obj.get("type") {
            let known = kind
                .as_str()
                .map(|k| INTERACTIVE_ELEMENT_TYPES.contains(&k))
                .unwrap_or(false);
            if !known {
                checker.report(
                    format!("{}/type", path),
                    format!("must be one of {}", INTERACTIVE_ELEMENT_TYPES.join(", ")),
                );
            }
        }
    });

    if let Some(metadata) = root.get("metadata") {
        if let Some(meta) = metadata.as_object() {
            check_metadata(&mut checker, meta);
        } else {
            checker.expect_kind("/metadata", metadata, Kind::Object);
        }
    }

    if checker.violations.is_empty() {
        Ok(())
    } else {
        Err(checker.violations)
    }
}

fn check_metadata(checker: &mut Checker, meta: &Map<String, Value>) {
    match meta.get("difficulty_level") {
        Some(level) => {
            if level.as_str().and_then(DifficultyLevel::parse).is_none() {
                checker.report(
                    "/metadata/difficulty_level",
                    "must be one of easy, intermediate, advanced",
                );
            }
        }
        None => checker.report("/metadata/difficulty_level", "required property missing"),
    }

    if !meta.contains_key("estimated_duration") {
        checker.report("/metadata/estimated_duration", "required property missing");
    }

    if let Some(tags) = meta.get("tags") {
        if let Some(items) = tags.as_array() {
            for (index, tag) in items.iter().enumerate() {
                checker.expect_kind(&format!("/metadata/tags/{}", index), tag, Kind::String);
            }
        } else {
            checker.expect_kind("/metadata/tags", tags, Kind::Array);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_lesson() -> Value {
        json!({
            "title": "Photosynthesis",
            "key_concepts": ["light", "water", "chlorophyll"],
            "sections": [
                {"title": "Intro", "duration": 5, "content": "Plants", "interactive_element": "ecosystem simulator"}
            ],
            "quizzes": [{"question": "What do plants need?", "options": ["light", "salt"], "answer": "light"}],
            "metadata": {"difficulty_level": "easy", "estimated_duration": 30, "tags": ["biology"]},
            "interactiveElements": [{"type": "graph", "title": "Growth", "data": [1, 2, 3]}]
        })
    }

    fn paths(violations: &[SchemaViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.path.as_str()).collect()
    }

    #[test]
    fn test_valid_lesson_passes() {
        assert!(validate_schema(&valid_lesson()).is_ok());
    }

    #[test]
    fn test_minimal_lesson_passes() {
        let lesson = json!({"title": "T", "key_concepts": ["a", "b", "c"], "sections": []});
        assert!(validate_schema(&lesson).is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let violations = validate_schema(&json!({})).unwrap_err();
        assert_eq!(paths(&violations), vec!["/title", "/key_concepts", "/sections"]);
    }

    #[test]
    fn test_too_few_key_concepts() {
        let mut lesson = valid_lesson();
        lesson["key_concepts"] = json!(["light", "water"]);
        let violations = validate_schema(&lesson).unwrap_err();
        assert_eq!(paths(&violations), vec!["/key_concepts"]);
        assert!(violations[0].message.contains("at least 3"));
    }

    #[test]
    fn test_malformed_section_and_quiz() {
        let mut lesson = valid_lesson();
        lesson["sections"] = json!([{"title": 4, "duration": "five"}, "not an object"]);
        lesson["quizzes"] = json!([{"options": "a,b"}]);
        let violations = validate_schema(&lesson).unwrap_err();
        assert_eq!(
            paths(&violations),
            vec!["/sections/0/title", "/sections/0/duration", "/sections/1", "/quizzes/0/options"]
        );
    }

    #[test]
    fn test_metadata_requirements() {
        let mut lesson = valid_lesson();
        lesson["metadata"] = json!({"difficulty_level": "expert"});
        let violations = validate_schema(&lesson).unwrap_err();
        assert_eq!(
            paths(&violations),
            vec!["/metadata/difficulty_level", "/metadata/estimated_duration"]
        );
    }

    #[test]
    fn test_unknown_interactive_element_type() {
        let mut lesson = valid_lesson();
        lesson["interactiveElements"] = json!([{"type": "video"}]);
        let violations = validate_schema(&lesson).unwrap_err();
        assert_eq!(paths(&violations), vec!["/interactiveElements/0/type"]);
    }

    #[test]
    fn test_non_object_lesson() {
        let violations = validate_schema(&json!([1, 2])).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), ": expected object, found array");
    }
}
