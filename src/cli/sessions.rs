//! Sessions command for Lectern.
//!
//! Lists a student's lesson sessions with their status and progress.

use serde::{Deserialize, Serialize};

use crate::core::SessionRecord;
use crate::session::SessionManager;
use crate::storage::document::format_timestamp;
use crate::storage::DocumentStore;

/// Options for the sessions command.
#[derive(Debug, Clone, Default)]
pub struct SessionsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Maximum number of sessions to show.
    pub limit: usize,
}

/// Summary of a single session for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub lesson_ref: String,
    pub status: String,
    pub progress: f64,
    /// Last modified timestamp (RFC 3339), if the store assigned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_reason: Option<String>,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(session: &SessionRecord) -> Self {
        Self {
            session_id: session.session_id.clone(),
            lesson_ref: session.lesson_ref.clone(),
            status: session.status.to_string(),
            progress: session.progress,
            last_modified: session.last_modified.map(format_timestamp),
            pause_reason: session.pause_reason.clone(),
        }
    }
}

/// Output format for the sessions command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsOutput {
    pub success: bool,
    pub student_id: String,
    pub sessions: Vec<SessionSummary>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionsOutput {
    pub fn success(student_id: impl Into<String>, sessions: Vec<SessionSummary>) -> Self {
        let count = sessions.len();
        Self {
            success: true,
            student_id: student_id.into(),
            sessions,
            count,
            error: None,
        }
    }

    pub fn failure(student_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            student_id: student_id.into(),
            sessions: vec![],
            count: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Sessions failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        if self.sessions.is_empty() {
            return format!("No sessions found for {}.", self.student_id);
        }

        let mut lines = vec![format!(
            "Sessions for {} ({} found):",
            self.student_id, self.count
        )];
        lines.push(String::new());
        lines.push(format!(
            "{:<44}  {:<12}  {:<8}  {:>8}  {}",
            "ID", "LESSON", "STATUS", "PROGRESS", "MODIFIED"
        ));
        lines.push("-".repeat(100));

        for session in &self.sessions {
            let modified: String = session
                .last_modified
                .as_deref()
                .unwrap_or("-")
                .chars()
                .take(19)
                .collect();
            lines.push(format!(
                "{:<44}  {:<12}  {:<8}  {:>7.1}%  {}",
                session.session_id, session.lesson_ref, session.status, session.progress, modified
            ));
        }

        lines.join("\n")
    }
}

/// The sessions command implementation.
pub struct SessionsCommand<S: DocumentStore> {
    sessions: SessionManager<S>,
}

impl<S: DocumentStore> SessionsCommand<S> {
    pub fn new(store: S) -> Self {
        Self {
            sessions: SessionManager::new(store),
        }
    }

    /// Run the sessions command. Most recently modified sessions come first.
    pub fn run(&self, student_id: &str, options: &SessionsOptions) -> SessionsOutput {
        match self.sessions.sessions_for_student(student_id) {
            Ok(mut sessions) => {
                sessions.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
                let summaries = sessions
                    .iter()
                    .take(options.limit)
                    .map(SessionSummary::from)
                    .collect();
                SessionsOutput::success(student_id, summaries)
            }
            Err(e) => SessionsOutput::failure(student_id, format!("Failed to list sessions: {}", e)),
        }
    }
}
