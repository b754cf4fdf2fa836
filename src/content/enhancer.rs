//! Lesson normalization.
//!
//! [`ContentEnhancer`] turns a loosely shaped lesson document into the
//! canonical [`EnhancedLesson`] snapshot. It never rejects input: missing
//! collections default to empty, untagged sections get a tool from the
//! catalog, and default practice sections are appended until the lesson has
//! at least [`MIN_INTERACTIVE_SECTIONS`] interactive sections.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Value};

use crate::content::Catalog;
use crate::core::{
    EnhancedContent, EnhancedLesson, EnhancedMetadata, LessonDocument, Section,
    DEFAULT_DURATION_MINUTES,
};

/// Minimum number of sections carrying an interactive element.
pub const MIN_INTERACTIVE_SECTIONS: usize = 3;

/// Title used when the lesson has none.
pub const UNTITLED_LESSON: &str = "Untitled Lesson";

/// Duration of each synthesized practice section, in minutes.
pub const PRACTICE_SECTION_MINUTES: f64 = 5.0;

/// Tool used when the catalog offers no tools at all.
const LAST_RESORT_TOOL: &str = "interactive quiz";

/// Builds canonical lesson snapshots from raw lesson documents.
#[derive(Debug, Clone)]
pub struct ContentEnhancer {
    catalog: Arc<Catalog>,
    default_duration: f64,
}

impl ContentEnhancer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            default_duration: DEFAULT_DURATION_MINUTES,
        }
    }

    /// Use `minutes` as the estimated duration of lessons that give none.
    pub fn with_default_duration(mut self, minutes: f64) -> Self {
        if minutes.is_finite() && minutes >= 0.0 {
            self.default_duration = minutes;
        }
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Normalize `raw` for `subject` using the thread-local rng.
    pub fn enhance(&self, subject: &str, raw: &Value) -> EnhancedLesson {
        self.enhance_with_rng(subject, raw, &mut rand::thread_rng())
    }

    /// Normalize `raw` for `subject`, drawing tools from `rng`.
    ///
    /// Already-canonical input (including a serialized [`EnhancedLesson`])
    /// comes back with the same sections.
    pub fn enhance_with_rng<R: Rng + ?Sized>(
        &self,
        subject: &str,
        raw: &Value,
        rng: &mut R,
    ) -> EnhancedLesson {
        let lesson = LessonDocument::from_value_lenient(&flatten_content(raw));
        let tools = self.catalog.tools_for(subject);
        if !self.catalog.has_subject(subject) {
            tracing::debug!(subject, "no subject tool catalog, using generic tools");
        }

        let mut sections = lesson.sections;
        for section in sections.iter_mut().filter(|s| !s.is_interactive()) {
            let tool = pick_tool(tools, rng);
            tracing::debug!(section = %section.title, tool = %tool, "assigned interactive element");
            section.interactive_element = Some(tool);
        }

        let interactive = sections.iter().filter(|s| s.is_interactive()).count();
        if interactive < MIN_INTERACTIVE_SECTIONS {
            let missing = MIN_INTERACTIVE_SECTIONS - interactive;
            tracing::info!(subject, added = missing, "adding default interactive sections");
            let topic = if lesson.topic.trim().is_empty() {
                subject
            } else {
                lesson.topic.as_str()
            };
            for n in 1..=missing {
                let tool = pick_tool(tools, rng);
                sections.push(Section::interactive(
                    format!("Interactive Practice {}", n),
                    PRACTICE_SECTION_MINUTES,
                    format!("Practice {} with the {}.", topic, tool),
                    tool,
                ));
            }
        }

        let estimated_duration = lesson
            .metadata
            .estimated_duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(self.default_duration);

        EnhancedLesson {
            lesson_ref: lesson.lesson_ref,
            title: lesson
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_LESSON.to_string()),
            content: EnhancedContent {
                introduction: or_empty_string(lesson.introduction),
                sections,
                key_concepts: lesson.key_concepts,
                examples: lesson.examples,
            },
            interactive_elements: lesson.interactive_elements,
            quizzes: lesson.quizzes,
            exam_content: lesson.exam_content,
            objectives: lesson.objectives,
            prerequisites: lesson.prerequisites,
            resources: lesson.resources,
            metadata: EnhancedMetadata {
                difficulty_level: lesson.metadata.difficulty_level.unwrap_or_default(),
                estimated_duration,
                tags: lesson.metadata.tags,
                subject: if lesson.subject.is_empty() {
                    subject.to_string()
                } else {
                    lesson.subject
                },
                topic: lesson.topic,
                grade_level: lesson.grade_level,
                curriculum_alignment: or_empty_object(lesson.curriculum_alignment),
            },
        }
    }
}

fn pick_tool<R: Rng + ?Sized>(tools: &[String], rng: &mut R) -> String {
    tools
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| LAST_RESORT_TOOL.to_string())
}

/// Lift the body fields of an enhanced snapshot to the top level, so
/// enhancing a snapshot again reads its sections.
fn flatten_content(raw: &Value) -> Value {
    let Some(obj) = raw.as_object() else {
        return raw.clone();
    };
    let Some(content) = obj.get("content").and_then(Value::as_object) else {
        return raw.clone();
    };

    let mut flat: Map<String, Value> = obj.clone();
    for key in ["introduction", "sections", "key_concepts", "examples"] {
        if !flat.contains_key(key) {
            if let Some(value) = content.get(key) {
                flat.insert(key.to_string(), value.clone());
            }
        }
    }
    Value::Object(flat)
}

fn or_empty_string(value: Value) -> Value {
    if value.is_null() {
        Value::String(String::new())
    } else {
        value
    }
}

fn or_empty_object(value: Value) -> Value {
    if value.is_null() {
        Value::Object(Map::new())
    } else {
        value
    }
}
