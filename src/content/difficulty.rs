//! Difficulty adaptation from a student's score history.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{DifficultyLevel, EnhancedLesson, Section};
use crate::error::{FailOpen, Result};
use crate::generation::TextGenerator;

/// Average score above which a lesson escalates to advanced.
pub const ADVANCED_THRESHOLD: f64 = 80.0;

/// Average score below which a lesson is simplified.
pub const EASY_THRESHOLD: f64 = 50.0;

pub const ADVANCED_SECTION_TITLE: &str = "Advanced Application";
pub const ADVANCED_SECTION_TOOL: &str = "case study simulator";
const ADVANCED_SECTION_CONTENT: &str =
    "Analyze a real-world case study that applies the lesson's key concepts.";
const ADVANCED_SECTION_MINUTES: f64 = 10.0;

/// A student's past performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentHistory {
    /// Mean score in percent. Absent history counts as zero.
    pub average_score: f64,
}

/// What [`adjust_difficulty`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyAdjustment {
    Escalated,
    Simplified,
    Unchanged,
}

/// Rewrites text for a struggling student.
pub trait TextSimplifier: Send + Sync {
    fn simplify(&self, text: &str) -> Result<String>;
}

/// Simplifier backed by the text generation service.
pub struct GeneratedSimplifier {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl GeneratedSimplifier {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }
}

impl TextSimplifier for GeneratedSimplifier {
    fn simplify(&self, text: &str) -> Result<String> {
        let prompt = format!(
            "Rewrite the following lesson text in simpler words for a student who is \
             struggling. Keep the meaning and reply with the rewritten text only.\n\n{}",
            text
        );
        let reply = self.generator.generate(&prompt, self.timeout)?;
        Ok(reply.trim().to_string())
    }
}

/// Adapt `lesson` to a student's average score.
///
/// Above [`ADVANCED_THRESHOLD`] the lesson becomes advanced and gains one
/// advanced-application section. Below [`EASY_THRESHOLD`] it becomes easy
/// and every section is simplified; a section whose simplification fails
/// keeps its text. Otherwise nothing changes.
pub fn adjust_difficulty(
    lesson: &mut EnhancedLesson,
    history: StudentHistory,
    simplifier: &dyn TextSimplifier,
) -> DifficultyAdjustment {
    let score = history.average_score;
    if score > ADVANCED_THRESHOLD {
        lesson.metadata.difficulty_level = DifficultyLevel::Advanced;
        lesson.content.sections.push(Section::interactive(
            ADVANCED_SECTION_TITLE,
            ADVANCED_SECTION_MINUTES,
            ADVANCED_SECTION_CONTENT,
            ADVANCED_SECTION_TOOL,
        ));
        tracing::info!(score, "escalated lesson to advanced");
        DifficultyAdjustment::Escalated
    } else if score < EASY_THRESHOLD {
        lesson.metadata.difficulty_level = DifficultyLevel::Easy;
        for section in &mut lesson.content.sections {
            let original = std::mem::take(&mut section.content);
            section.content = simplifier
                .simplify(&original)
                .fail_open_with("Simplifying section content", original);
        }
        tracing::info!(score, sections = lesson.section_count(), "simplified lesson");
        DifficultyAdjustment::Simplified
    } else {
        DifficultyAdjustment::Unchanged
    }
}
