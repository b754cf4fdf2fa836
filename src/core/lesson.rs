//! Lesson documents and their curriculum addressing.
//!
//! Lessons are authored externally and arrive loosely shaped. [`LessonDocument`]
//! is the lenient typed view of one stored lesson; [`EnhancedLesson`] is the
//! canonical snapshot handed to a student session.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LecternError, Result};

/// Default estimated lesson duration in minutes.
pub const DEFAULT_DURATION_MINUTES: f64 = 30.0;

/// Composite curriculum path identifying a lesson document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonPath {
    pub country: String,
    pub curriculum: String,
    pub grade: String,
    pub level: String,
    pub subject: String,
    pub lesson_ref: String,
}

/// Collection names interleaved with the path components, in order.
const PATH_COLLECTIONS: [&str; 6] = [
    "countries",
    "curriculums",
    "grades",
    "levels",
    "subjects",
    "lessonRef",
];

impl LessonPath {
    /// Create a lesson path from its components.
    pub fn new(
        country: impl Into<String>,
        curriculum: impl Into<String>,
        grade: impl Into<String>,
        level: impl Into<String>,
        subject: impl Into<String>,
        lesson_ref: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            curriculum: curriculum.into(),
            grade: grade.into(),
            level: level.into(),
            subject: subject.into(),
            lesson_ref: lesson_ref.into(),
        }
    }

    fn components(&self) -> [&str; 6] {
        [
            &self.country,
            &self.curriculum,
            &self.grade,
            &self.level,
            &self.subject,
            &self.lesson_ref,
        ]
    }

    /// The document-store path of this lesson.
    ///
    /// `countries/{c}/curriculums/{cu}/grades/{g}/levels/{l}/subjects/{s}/lessonRef/{r}`
    pub fn document_path(&self) -> String {
        PATH_COLLECTIONS
            .iter()
            .zip(self.components())
            .map(|(collection, id)| format!("{}/{}", collection, id))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Parse a document path produced by [`LessonPath::document_path`].
    ///
    /// A single leading `/` is tolerated.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() != PATH_COLLECTIONS.len() * 2 {
            return Err(LecternError::validation(format!(
                "invalid lesson path '{}': expected {} segments, found {}",
                path,
                PATH_COLLECTIONS.len() * 2,
                parts.len()
            )));
        }

        let mut ids = Vec::with_capacity(PATH_COLLECTIONS.len());
        for (pair, expected) in parts.chunks(2).zip(PATH_COLLECTIONS) {
            if pair[0] != expected {
                return Err(LecternError::validation(format!(
                    "invalid lesson path '{}': expected '{}' but found '{}'",
                    path, expected, pair[0]
                )));
            }
            if pair[1].trim().is_empty() {
                return Err(LecternError::validation(format!(
                    "invalid lesson path '{}': empty {} id",
                    path, expected
                )));
            }
            ids.push(pair[1].to_string());
        }

        Ok(Self::new(
            ids[0].clone(),
            ids[1].clone(),
            ids[2].clone(),
            ids[3].clone(),
            ids[4].clone(),
            ids[5].clone(),
        ))
    }
}

impl std::fmt::Display for LessonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.document_path())
    }
}

/// Difficulty of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(DifficultyLevel::Easy),
            "intermediate" => Some(DifficultyLevel::Intermediate),
            "advanced" => Some(DifficultyLevel::Advanced),
            _ => None,
        }
    }
}

/// One ordered section of a lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub title: String,
    /// Duration in minutes.
    pub duration: f64,
    pub content: String,
    /// Interactive element (tool) attached to the section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_element: Option<String>,
}

impl Section {
    /// Create a section with the given tool attached.
    pub fn interactive(
        title: impl Into<String>,
        duration: f64,
        content: impl Into<String>,
        tool: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            duration,
            content: content.into(),
            interactive_element: Some(tool.into()),
        }
    }

    /// Whether the section carries a non-blank interactive element.
    pub fn is_interactive(&self) -> bool {
        self.interactive_element
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    /// Read a section from an arbitrary JSON value, defaulting malformed fields.
    pub fn from_value_lenient(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            title: lenient(obj, "title"),
            duration: lenient(obj, "duration"),
            content: lenient(obj, "content"),
            interactive_element: lenient(obj, "interactive_element"),
        }
    }
}

/// A quiz attached to a lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quiz {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub question: String,
    pub options: Vec<Value>,
    pub answer: String,
}

/// Lesson metadata as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonMetadata {
    pub difficulty_level: Option<DifficultyLevel>,
    /// Estimated duration in minutes.
    pub estimated_duration: Option<f64>,
    pub tags: Vec<String>,
}

/// Lenient typed view of a stored lesson document.
///
/// Every field defaults when absent or malformed, so reading never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonDocument {
    #[serde(rename = "lessonRef")]
    pub lesson_ref: String,
    pub title: Option<String>,
    pub subject: String,
    #[serde(rename = "gradeLevel")]
    pub grade_level: String,
    pub topic: String,
    pub introduction: Value,
    pub key_concepts: Vec<String>,
    pub sections: Vec<Section>,
    pub quizzes: Vec<Quiz>,
    #[serde(rename = "interactiveElements")]
    pub interactive_elements: Vec<Value>,
    pub examples: Vec<Value>,
    #[serde(rename = "examContent")]
    pub exam_content: Vec<Value>,
    pub objectives: Vec<String>,
    pub prerequisites: Vec<Value>,
    pub resources: Vec<Value>,
    #[serde(rename = "curriculumAlignment")]
    pub curriculum_alignment: Value,
    pub metadata: LessonMetadata,
}

impl LessonDocument {
    /// Read a lesson from arbitrary JSON, defaulting each malformed field
    /// independently instead of rejecting the whole document.
    pub fn from_value_lenient(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let sections = obj
            .get("sections")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Section::from_value_lenient).collect())
            .unwrap_or_default();

        let metadata = obj
            .get("metadata")
            .and_then(Value::as_object)
            .map(|meta| LessonMetadata {
                difficulty_level: lenient(meta, "difficulty_level"),
                estimated_duration: lenient(meta, "estimated_duration"),
                tags: lenient(meta, "tags"),
            })
            .unwrap_or_default();

        let quizzes = obj
            .get("quizzes")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|q| serde_json::from_value(q.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let mut objectives: Vec<String> = lenient(obj, "objectives");
        if objectives.is_empty() {
            objectives = lenient(obj, "learningObjectives");
        }

        Self {
            lesson_ref: lenient(obj, "lessonRef"),
            title: lenient(obj, "title"),
            subject: lenient(obj, "subject"),
            grade_level: lenient(obj, "gradeLevel"),
            topic: lenient(obj, "topic"),
            introduction: obj.get("introduction").cloned().unwrap_or(Value::Null),
            key_concepts: lenient(obj, "key_concepts"),
            sections,
            quizzes,
            interactive_elements: lenient(obj, "interactiveElements"),
            examples: lenient(obj, "examples"),
            exam_content: lenient(obj, "examContent"),
            objectives,
            prerequisites: lenient(obj, "prerequisites"),
            resources: lenient(obj, "resources"),
            curriculum_alignment: obj
                .get("curriculumAlignment")
                .cloned()
                .unwrap_or(Value::Null),
            metadata,
        }
    }

    /// Estimated duration in minutes, or the default when unspecified.
    pub fn estimated_duration(&self) -> f64 {
        self.metadata
            .estimated_duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }
}

/// Read `key` from `obj` as `T`, or `T::default()` if absent or malformed.
fn lenient<T: DeserializeOwned + Default>(obj: &Map<String, Value>, key: &str) -> T {
    obj.get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// Body of an enhanced lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedContent {
    pub introduction: Value,
    pub sections: Vec<Section>,
    pub key_concepts: Vec<String>,
    pub examples: Vec<Value>,
}

/// Metadata of an enhanced lesson, with every field resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedMetadata {
    pub difficulty_level: DifficultyLevel,
    pub estimated_duration: f64,
    pub tags: Vec<String>,
    pub subject: String,
    pub topic: String,
    pub grade_level: String,
    pub curriculum_alignment: Value,
}

/// Canonical lesson snapshot handed to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedLesson {
    #[serde(rename = "lessonRef")]
    pub lesson_ref: String,
    pub title: String,
    pub content: EnhancedContent,
    #[serde(rename = "interactiveElements")]
    pub interactive_elements: Vec<Value>,
    pub quizzes: Vec<Quiz>,
    #[serde(rename = "examContent")]
    pub exam_content: Vec<Value>,
    pub objectives: Vec<String>,
    pub prerequisites: Vec<Value>,
    pub resources: Vec<Value>,
    pub metadata: EnhancedMetadata,
}

impl EnhancedLesson {
    /// Number of sections in the lesson body.
    pub fn section_count(&self) -> usize {
        self.content.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_path() -> LessonPath {
        LessonPath::new("Nigeria", "NERDC", "Year 3", "Primary", "Science", "SCI-301")
    }

    #[test]
    fn test_document_path() {
        assert_eq!(
            sample_path().document_path(),
            "countries/Nigeria/curriculums/NERDC/grades/Year 3/levels/Primary/subjects/Science/lessonRef/SCI-301"
        );
    }

    #[test]
    fn test_parse_round_trips_document_path() {
        let path = sample_path();
        assert_eq!(LessonPath::parse(&path.document_path()).unwrap(), path);
        let with_slash = format!("/{}", path.document_path());
        assert_eq!(LessonPath::parse(&with_slash).unwrap(), path);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(LessonPath::parse("countries/Nigeria").is_err());
        assert!(LessonPath::parse(
            "countries/N/curriculums/C/grades/G/levels/L/topics/S/lessonRef/R"
        )
        .is_err());
        assert!(LessonPath::parse(
            "countries/N/curriculums/C/grades/G/levels/L/subjects/S/lessonRef/ "
        )
        .is_err());
    }

    #[test]
    fn test_section_is_interactive() {
        let mut section = Section::interactive("Intro", 5.0, "text", "visual aids");
        assert!(section.is_interactive());
        section.interactive_element = Some("   ".to_string());
        assert!(!section.is_interactive());
        section.interactive_element = None;
        assert!(!section.is_interactive());
    }

    #[test]
    fn test_lenient_read_tolerates_malformed_fields() {
        let raw = json!({
            "title": 42,
            "key_concepts": "not a list",
            "sections": [
                {"title": "One", "duration": "ten", "content": "c"},
                "garbage"
            ],
            "metadata": {"difficulty_level": "impossible", "estimated_duration": 45}
        });

        let lesson = LessonDocument::from_value_lenient(&raw);
        assert_eq!(lesson.title, None);
        assert!(lesson.key_concepts.is_empty());
        assert_eq!(lesson.sections.len(), 2);
        assert_eq!(lesson.sections[0].title, "One");
        assert_eq!(lesson.sections[0].duration, 0.0);
        assert_eq!(lesson.sections[1], Section::default());
        assert_eq!(lesson.metadata.difficulty_level, None);
        assert_eq!(lesson.estimated_duration(), 45.0);
    }

    #[test]
    fn test_lenient_read_of_non_object() {
        let lesson = LessonDocument::from_value_lenient(&json!([1, 2, 3]));
        assert_eq!(lesson, LessonDocument::default());
    }

    #[test]
    fn test_estimated_duration_defaults_to_thirty() {
        let lesson = LessonDocument::default();
        assert_eq!(lesson.estimated_duration(), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn test_learning_objectives_alias() {
        let raw = json!({"learningObjectives": ["explain photosynthesis"]});
        let lesson = LessonDocument::from_value_lenient(&raw);
        assert_eq!(lesson.objectives, vec!["explain photosynthesis".to_string()]);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(DifficultyLevel::parse("easy"), Some(DifficultyLevel::Easy));
        assert_eq!(DifficultyLevel::parse("Hard"), None);
        assert_eq!(DifficultyLevel::default(), DifficultyLevel::Intermediate);
    }
}
