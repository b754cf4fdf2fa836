//! Session and lesson-state records.
//!
//! A [`SessionRecord`] and its [`LessonStateRecord`] share one id and are
//! written side by side when a student starts a lesson.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analytics::metrics;

/// Prefix of generated session ids.
pub const SESSION_ID_PREFIX: &str = "session_";

/// Completion status written on session creation.
pub const COMPLETION_IN_PROGRESS: &str = "in_progress";

/// Pause reason recorded when the caller gives none.
pub const DEFAULT_PAUSE_REASON: &str = "No reason provided";

/// Generate a fresh session id.
pub fn new_session_id() -> String {
    format!("{}{}", SESSION_ID_PREFIX, uuid::Uuid::new_v4())
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Paused,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempt by one student at one lesson.
///
/// Timestamps are assigned by the store on write, so they are absent on a
/// freshly built record and present once read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub student_id: String,
    pub lesson_ref: String,
    pub lesson_path: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub completion_status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_resumed: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Build a new active session with zero progress.
    pub fn new(
        session_id: impl Into<String>,
        student_id: impl Into<String>,
        lesson_ref: impl Into<String>,
        lesson_path: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            student_id: student_id.into(),
            lesson_ref: lesson_ref.into(),
            lesson_path: lesson_path.into(),
            status: SessionStatus::Active,
            completion_status: COMPLETION_IN_PROGRESS.to_string(),
            progress: 0.0,
            created_at: None,
            last_interaction: None,
            last_modified: None,
            last_active: None,
            pause_reason: None,
            last_resumed: None,
        }
    }
}

/// Position of the student within the lesson's learning path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningPath {
    pub current_module: usize,
    pub modules_completed: Vec<usize>,
    pub next_objectives: Vec<String>,
}

impl LearningPath {
    /// Start a path whose next objectives are the first three lesson objectives.
    pub fn starting_from(objectives: &[String]) -> Self {
        Self {
            current_module: 0,
            modules_completed: Vec::new(),
            next_objectives: objectives.iter().take(3).cloned().collect(),
        }
    }
}

/// Mutable progress counters paired 1:1 with a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonStateRecord {
    pub session_id: String,
    pub student_id: String,
    pub lesson_ref: String,
    #[serde(default)]
    pub current_section: usize,
    #[serde(default)]
    pub completed_sections: BTreeSet<usize>,
    #[serde(default)]
    pub total_sections: usize,
    #[serde(default)]
    pub quiz_attempts: u32,
    #[serde(default)]
    pub current_score: f64,
    #[serde(default)]
    pub interactive_elements_state: Map<String, Value>,
    /// Cumulative minutes spent.
    #[serde(default)]
    pub time_spent: f64,
    /// Target lesson duration in minutes.
    #[serde(default)]
    pub total_duration: f64,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub learning_path: LearningPath,
}

impl LessonStateRecord {
    /// Build zeroed counters for a new session.
    pub fn new(
        session_id: impl Into<String>,
        student_id: impl Into<String>,
        lesson_ref: impl Into<String>,
        total_sections: usize,
        total_duration: f64,
        learning_path: LearningPath,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            student_id: student_id.into(),
            lesson_ref: lesson_ref.into(),
            current_section: 0,
            completed_sections: BTreeSet::new(),
            total_sections,
            quiz_attempts: 0,
            current_score: 0.0,
            interactive_elements_state: Map::new(),
            time_spent: 0.0,
            total_duration,
            last_activity: None,
            learning_path,
        }
    }

    /// Completion percentage in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        let completed = self
            .completed_sections
            .iter()
            .filter(|index| **index < self.total_sections)
            .count();
        metrics::progress_percentage(completed, self.total_sections)
    }

    /// Engagement rate for the current time on task.
    pub fn engagement_rate(&self) -> f64 {
        metrics::engagement_rate(self.time_spent, self.total_duration)
    }
}

/// Snapshot written by the save-progress operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub session_id: String,
    pub user_id: String,
    pub lesson_ref: String,
    pub progress: f64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state_with(total: usize, completed: &[usize]) -> LessonStateRecord {
        let mut state =
            LessonStateRecord::new("s", "student", "L1", total, 30.0, LearningPath::default());
        state.completed_sections = completed.iter().copied().collect();
        state
    }

    #[test]
    fn test_session_id_has_prefix() {
        let id = new_session_id();
        assert!(id.starts_with(SESSION_ID_PREFIX));
        assert_ne!(id, new_session_id());
    }

    #[test]
    fn test_new_session_is_active() {
        let record = SessionRecord::new("session_1", "student", "L1", "countries/x");
        assert_eq!(record.status, SessionStatus::Active);
        assert_eq!(record.completion_status, COMPLETION_IN_PROGRESS);
        assert_eq!(record.progress, 0.0);
    }

    #[test]
    fn test_session_optional_fields_skipped() {
        let record = SessionRecord::new("session_1", "student", "L1", "countries/x");
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("pause_reason").is_none());
        assert_eq!(value["status"], "active");
    }

    #[test]
    fn test_progress_zero_without_sections() {
        assert_eq!(state_with(0, &[]).progress(), 0.0);
        assert_eq!(state_with(0, &[0, 1]).progress(), 0.0);
    }

    #[test]
    fn test_progress_half() {
        assert_eq!(state_with(4, &[0, 2]).progress(), 50.0);
    }

    #[test]
    fn test_progress_ignores_out_of_range_indices() {
        assert_eq!(state_with(2, &[0, 1, 7]).progress(), 100.0);
    }

    #[test]
    fn test_learning_path_takes_three_objectives() {
        let objectives: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let path = LearningPath::starting_from(&objectives);
        assert_eq!(path.next_objectives, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_completed_sections_serialize_as_array() {
        let value = serde_json::to_value(state_with(3, &[2, 0])).unwrap();
        assert_eq!(value["completed_sections"], serde_json::json!([0, 2]));
    }

    proptest! {
        #[test]
        fn prop_progress_in_range(total in 0usize..50, completed in proptest::collection::vec(0usize..60, 0..60)) {
            let progress = state_with(total, &completed).progress();
            prop_assert!((0.0..=100.0).contains(&progress));
            if total == 0 {
                prop_assert_eq!(progress, 0.0);
            }
        }
    }
}
