//! Lesson notes with generated homework.
//!
//! Notes restate a lesson's key concepts, examples and summary, and carry
//! three homework tasks. Generated notes are returned to the caller; saving
//! is a separate overwrite of `lesson_notes/{lesson_ref}`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LecternError, Result};
use crate::generation::TextGenerator;
use crate::storage::{paths, server_timestamp, to_document, DocumentStore, DocumentStoreExt, WriteMode};

pub const DEFAULT_PRACTICE_ACTIVITY: &str =
    "Review the key concepts from the lesson and write a short paragraph about what you learned.";
pub const DEFAULT_FUN_ACTIVITY: &str =
    "Create a poster or drawing that represents the topic covered in this lesson.";
pub const DEFAULT_EXPLORE_AI: &str =
    "Upload these lesson notes into NotebookLM to explore further questions about the topic.";

const HOMEWORK_MARKER: &str = "**Homework:**";
const PRACTICE_MARKER: &str = "**Practice Activity:**";
const FUN_MARKER: &str = "**Fun Activity:**";
const EXPLORATION_MARKER: &str = "**Exploration Task:**";

/// The three homework tasks attached to lesson notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Homework {
    pub practice_activity: String,
    pub fun_activity: String,
    pub explore_ai: String,
}

impl Default for Homework {
    fn default() -> Self {
        Self {
            practice_activity: DEFAULT_PRACTICE_ACTIVITY.to_string(),
            fun_activity: DEFAULT_FUN_ACTIVITY.to_string(),
            explore_ai: DEFAULT_EXPLORE_AI.to_string(),
        }
    }
}

/// Extract homework tasks from generated text.
///
/// Tasks are only read after a `**Homework:**` marker, one per line. Any
/// task the text does not name keeps its default.
pub fn parse_homework(text: &str) -> Homework {
    let mut homework = Homework::default();
    let Some((_, section)) = text.split_once(HOMEWORK_MARKER) else {
        return homework;
    };

    for line in section.lines() {
        let task = |marker: &str| {
            line.split_once(marker)
                .map(|(_, rest)| rest.trim().to_string())
        };
        if let Some(practice) = task(PRACTICE_MARKER) {
            homework.practice_activity = practice;
        } else if let Some(fun) = task(FUN_MARKER) {
            homework.fun_activity = fun;
        } else if let Some(explore) = task(EXPLORATION_MARKER) {
            homework.explore_ai = explore;
        }
    }
    homework
}

fn default_key_concepts() -> Vec<String> {
    vec!["No key concepts available.".to_string()]
}

fn default_summary() -> String {
    "No summary available.".to_string()
}

fn default_title() -> String {
    "Untitled Lesson".to_string()
}

fn default_topic() -> String {
    "Untitled Topic".to_string()
}

fn default_theme() -> String {
    "General".to_string()
}

/// Lesson material the notes are written from. Absent fields take placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesSource {
    #[serde(default = "default_key_concepts", rename = "key_concepts")]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_title")]
    pub lesson_title: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
}

impl Default for NotesSource {
    fn default() -> Self {
        Self {
            key_concepts: default_key_concepts(),
            examples: Vec::new(),
            summary: default_summary(),
            lesson_title: default_title(),
            topic: default_topic(),
            theme: default_theme(),
            learning_objectives: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesContent {
    pub key_concepts: Vec<String>,
    pub examples: Vec<String>,
    pub summary: String,
}

/// Lesson notes as returned and stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LessonNotes {
    pub lesson_ref: String,
    pub subject: String,
    pub grade_level: String,
    pub theme: String,
    pub topic: String,
    pub lesson_title: String,
    pub learning_objectives: Vec<String>,
    pub content: NotesContent,
    pub homework: Homework,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Build the homework prompt.
pub fn homework_prompt(grade: &str, subject: &str, source: &NotesSource) -> String {
    let examples = if source.examples.is_empty() {
        "No examples available.".to_string()
    } else {
        source.examples.join(", ")
    };
    format!(
        "Generate age-appropriate homework for a {grade} student based on the following lesson:\n\n\
         **Lesson Title:** {}\n\
         **Subject:** {}\n\
         **Topic:** {}\n\
         **Key Concepts:** {}\n\
         **Examples:** {}\n\
         **Summary:** {}\n\n\
         **Instructions for Homework:**\n\
         1. Create fun and interactive homework tasks that reinforce the lesson content.\n\
         2. Use simple, age-appropriate language suitable for a {grade} student.\n\
         3. Include at least one practice activity, one fun activity, and one exploration task.\n\
         4. Start the tasks with {HOMEWORK_MARKER} and put each on its own line, prefixed with \
         {PRACTICE_MARKER}, {FUN_MARKER} or {EXPLORATION_MARKER}.\n\n\
         Please generate the homework now.",
        source.lesson_title,
        subject,
        source.topic,
        source.key_concepts.join(", "),
        examples,
        source.summary,
    )
}

/// Generates and stores lesson notes.
pub struct NotesWriter<S: DocumentStore> {
    store: S,
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl<S: DocumentStore> NotesWriter<S> {
    pub fn new(store: S, generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            store,
            generator,
            timeout,
        }
    }

    /// Generate notes with homework for a lesson. Nothing is written.
    pub fn generate_notes(
        &self,
        lesson_ref: &str,
        subject: &str,
        grade: &str,
        source: &NotesSource,
    ) -> Result<LessonNotes> {
        self.generate_notes_at(lesson_ref, subject, grade, source, Utc::now())
    }

    /// [`generate_notes`](Self::generate_notes) with an explicit clock.
    pub fn generate_notes_at(
        &self,
        lesson_ref: &str,
        subject: &str,
        grade: &str,
        source: &NotesSource,
        now: DateTime<Utc>,
    ) -> Result<LessonNotes> {
        let prompt = homework_prompt(grade, subject, source);
        let text = self
            .generator
            .generate(&prompt, self.timeout)
            .inspect_err(|err| tracing::error!(lesson_ref, error = %err, "homework generation failed"))?;
        let homework = parse_homework(&text);

        Ok(LessonNotes {
            lesson_ref: lesson_ref.to_string(),
            subject: subject.to_string(),
            grade_level: grade.to_string(),
            theme: source.theme.clone(),
            topic: source.topic.clone(),
            lesson_title: source.lesson_title.clone(),
            learning_objectives: source.learning_objectives.clone(),
            content: NotesContent {
                key_concepts: source.key_concepts.clone(),
                examples: source.examples.clone(),
                summary: source.summary.clone(),
            },
            homework,
            timestamp: Some(now),
        })
    }

    /// Overwrite the stored notes for `notes.lesson_ref`, stamped with the server time.
    pub fn save_notes(&self, notes: &LessonNotes) -> Result<()> {
        let lesson_ref = notes.lesson_ref.trim();
        if lesson_ref.is_empty() || lesson_ref.contains('/') {
            return Err(LecternError::validation(format!(
                "invalid lesson_ref '{}'",
                notes.lesson_ref
            )));
        }

        let mut document = to_document(notes)?;
        document.insert("timestamp".into(), server_timestamp());
        self.store
            .set(&paths::lesson_notes(lesson_ref), document, WriteMode::Overwrite)?;

        tracing::info!(lesson_ref, "saved lesson notes");
        Ok(())
    }

    /// Read stored notes.
    pub fn get_notes(&self, lesson_ref: &str) -> Result<LessonNotes> {
        self.store
            .get_as(&paths::lesson_notes(lesson_ref))?
            .ok_or_else(|| LecternError::not_found("lesson notes", lesson_ref))
    }
}
