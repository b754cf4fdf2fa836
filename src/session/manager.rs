//! Session lifecycle and lesson-state bookkeeping.
//!
//! A session moves `active -> paused -> active -> ...`. Each session is
//! paired with a lesson-state record under the same id. The two records are
//! written one after the other with no rollback, so a failed second write
//! leaves a session without its lesson state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::content::ContentEnhancer;
use crate::core::{
    clamp_minutes, new_session_id, EnhancedLesson, LearningPath, LessonPath, LessonStateRecord,
    ProgressSnapshot, SessionRecord, SessionStatus, DEFAULT_PAUSE_REASON,
};
use crate::error::{LecternError, Result};
use crate::session::lookup::{find_lesson, FoundLesson};
use crate::storage::document::format_timestamp;
use crate::storage::{
    paths, server_timestamp, to_document, Document, DocumentStore, DocumentStoreExt, Filter,
    WriteMode,
};

/// Result of starting a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializedSession {
    pub session_id: String,
    pub lesson: EnhancedLesson,
    pub state: LessonStateRecord,
}

/// Cumulative time on task after recording an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeUpdate {
    pub time_spent: f64,
    pub total_duration: f64,
    pub engagement_rate: f64,
}

impl TimeUpdate {
    pub fn of(state: &LessonStateRecord) -> Self {
        Self {
            time_spent: state.time_spent,
            total_duration: state.total_duration,
            engagement_rate: state.engagement_rate(),
        }
    }
}

/// Progress after completing a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionProgress {
    pub progress: f64,
    pub state: LessonStateRecord,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(LecternError::validation(format!("Missing required fields: {}", field)))
    } else {
        Ok(())
    }
}

fn timestamp_or_server(at: Option<DateTime<Utc>>) -> Value {
    at.map(|t| Value::String(format_timestamp(t)))
        .unwrap_or_else(server_timestamp)
}

/// Owns session creation, pause/resume and lesson-state updates.
pub struct SessionManager<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the lesson at `path`.
    pub fn find_lesson(&self, path: &LessonPath) -> Result<FoundLesson> {
        find_lesson(&self.store, path)
    }

    /// Enhance `lesson_data` and start a session on it.
    pub fn initialize(
        &self,
        student_id: &str,
        lesson_ref: &str,
        lesson_path: &str,
        lesson_data: &Value,
        enhancer: &ContentEnhancer,
    ) -> Result<InitializedSession> {
        let subject = lesson_data
            .get("subject")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let lesson = enhancer.enhance(subject, lesson_data);
        self.start_session(student_id, lesson_ref, lesson_path, lesson)
    }

    /// Start a session on an already enhanced lesson.
    ///
    /// Writes the session record, then the lesson state. If the second
    /// write fails the session record stays behind.
    pub fn start_session(
        &self,
        student_id: &str,
        lesson_ref: &str,
        lesson_path: &str,
        mut lesson: EnhancedLesson,
    ) -> Result<InitializedSession> {
        require("student_id", student_id)?;
        require("lesson_ref", lesson_ref)?;
        lesson.lesson_ref = lesson_ref.to_string();

        let session_id = new_session_id();

        let mut session = to_document(&SessionRecord::new(
            &session_id,
            student_id,
            lesson_ref,
            lesson_path,
        ))?;
        for key in ["created_at", "last_interaction", "last_modified"] {
            session.insert(key.to_string(), server_timestamp());
        }
        self.store
            .set(&paths::session(&session_id), session, WriteMode::Overwrite)
            .inspect_err(|err| tracing::error!(session_id = %session_id, error = %err, "failed to write session"))?;

        let state = LessonStateRecord::new(
            &session_id,
            student_id,
            lesson_ref,
            lesson.section_count(),
            lesson.metadata.estimated_duration,
            LearningPath::starting_from(&lesson.objectives),
        );
        self.write_state(&state)
            .inspect_err(|err| tracing::error!(session_id = %session_id, error = %err, "failed to write lesson state"))?;

        tracing::info!(
            session_id = %session_id,
            student_id,
            lesson_ref,
            sections = state.total_sections,
            total_duration = state.total_duration,
            "started session"
        );
        Ok(InitializedSession {
            session_id,
            lesson,
            state,
        })
    }

    /// Pause a session. An omitted reason is recorded as the default.
    pub fn pause(
        &self,
        session_id: &str,
        at: Option<DateTime<Utc>>,
        reason: Option<&str>,
    ) -> Result<()> {
        require("session_id", session_id)?;
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_PAUSE_REASON);

        let mut fields = Document::new();
        fields.insert("status".into(), SessionStatus::Paused.as_str().into());
        fields.insert("last_active".into(), timestamp_or_server(at));
        fields.insert("pause_reason".into(), reason.into());
        fields.insert("last_modified".into(), server_timestamp());
        self.update_session(session_id, fields)?;

        tracing::info!(session_id, reason, "paused session");
        Ok(())
    }

    /// Resume a session. The last pause reason is kept.
    pub fn resume(&self, session_id: &str, at: Option<DateTime<Utc>>) -> Result<()> {
        require("session_id", session_id)?;

        let mut fields = Document::new();
        fields.insert("status".into(), SessionStatus::Active.as_str().into());
        fields.insert("last_resumed".into(), timestamp_or_server(at));
        fields.insert("last_modified".into(), server_timestamp());
        self.update_session(session_id, fields)?;

        tracing::info!(session_id, "resumed session");
        Ok(())
    }

    fn update_session(&self, session_id: &str, fields: Document) -> Result<()> {
        self.store
            .update(&paths::session(session_id), fields)
            .map_err(|err| match err {
                LecternError::NotFound { .. } => LecternError::not_found("session", session_id),
                other => other,
            })
    }

    pub fn get_session(&self, session_id: &str) -> Result<SessionRecord> {
        self.store
            .get_as(&paths::session(session_id))?
            .ok_or_else(|| LecternError::not_found("session", session_id))
    }

    pub fn get_state(&self, session_id: &str) -> Result<LessonStateRecord> {
        self.store
            .get_as(&paths::lesson_state(session_id))?
            .ok_or_else(|| LecternError::not_found("lesson state", session_id))
    }

    /// Sessions of one student, ordered by id.
    pub fn sessions_for_student(&self, student_id: &str) -> Result<Vec<SessionRecord>> {
        self.store
            .query(paths::SESSIONS, &Filter::all().eq("student_id", student_id))?
            .into_iter()
            .map(|(_, doc)| crate::storage::from_document(doc))
            .collect()
    }

    /// The lesson state after adding `minutes`, without writing it.
    ///
    /// Negative and non-finite minutes add nothing.
    pub fn project_time(&self, session_id: &str, minutes: f64) -> Result<LessonStateRecord> {
        let mut state = self.get_state(session_id)?;
        state.time_spent += clamp_minutes(minutes);
        Ok(state)
    }

    /// Persist a lesson state, stamping its activity time.
    pub fn commit_state(&self, state: &LessonStateRecord) -> Result<()> {
        self.write_state(state)
    }

    /// Add `minutes` to the session's time on task.
    pub fn record_time(&self, session_id: &str, minutes: f64) -> Result<TimeUpdate> {
        let state = self.project_time(session_id, minutes)?;
        self.commit_state(&state)?;
        let update = TimeUpdate::of(&state);
        tracing::debug!(
            session_id,
            time_spent = update.time_spent,
            engagement_rate = update.engagement_rate,
            "recorded time on task"
        );
        Ok(update)
    }

    /// Completion percentage of a lesson state.
    pub fn progress(state: &LessonStateRecord) -> f64 {
        state.progress()
    }

    /// Mark section `index` complete and write the new progress to the session.
    pub fn complete_section(&self, session_id: &str, index: usize) -> Result<SectionProgress> {
        require("session_id", session_id)?;
        let mut state = self.get_state(session_id)?;
        if index >= state.total_sections {
            return Err(LecternError::validation(format!(
                "section index {} out of range for {} sections",
                index, state.total_sections
            )));
        }

        state.completed_sections.insert(index);
        let next = (index + 1).min(state.total_sections - 1);
        state.current_section = state.current_section.max(next);
        self.write_state(&state)?;

        let progress = state.progress();
        let mut fields = Document::new();
        fields.insert("progress".into(), progress.into());
        fields.insert("last_interaction".into(), server_timestamp());
        fields.insert("last_modified".into(), server_timestamp());
        self.update_session(session_id, fields)?;

        tracing::info!(session_id, index, progress, "completed section");
        Ok(SectionProgress { progress, state })
    }

    /// Write a progress snapshot for a session.
    pub fn save_progress(
        &self,
        session_id: &str,
        user_id: &str,
        lesson_ref: &str,
        progress: f64,
    ) -> Result<ProgressSnapshot> {
        require("session_id", session_id)?;
        require("user_id", user_id)?;
        require("lesson_ref", lesson_ref)?;
        if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
            return Err(LecternError::validation(format!(
                "progress must be between 0 and 100, got {}",
                progress
            )));
        }

        let snapshot = ProgressSnapshot {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            lesson_ref: lesson_ref.to_string(),
            progress,
            updated_at: None,
        };
        let mut document = to_document(&snapshot)?;
        document.insert("updated_at".into(), server_timestamp());

        let path = paths::progress(session_id);
        self.store.set(&path, document, WriteMode::Overwrite)?;
        tracing::debug!(session_id, progress, "saved progress");

        self.store
            .get_as(&path)?
            .ok_or_else(|| LecternError::persistence(format!("progress snapshot vanished: {}", path)))
    }

    fn write_state(&self, state: &LessonStateRecord) -> Result<()> {
        let mut document = to_document(state)?;
        document.insert("last_activity".into(), server_timestamp());
        self.store.set(
            &paths::lesson_state(&state.session_id),
            document,
            WriteMode::Overwrite,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Catalog;
    use crate::storage::MemoryDocumentStore;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Arc;

    fn manager() -> SessionManager<Arc<MemoryDocumentStore>> {
        SessionManager::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn enhancer() -> ContentEnhancer {
        ContentEnhancer::new(Arc::new(Catalog::default()))
    }

    fn lesson_data() -> Value {
        json!({
            "subject": "Science",
            "title": "Photosynthesis",
            "objectives": ["one", "two", "three", "four"],
            "sections": [
                {"title": "A", "content": "a", "interactive_element": "molecular modeler"},
                {"title": "B", "content": "b", "interactive_element": "ecosystem simulator"},
                {"title": "C", "content": "c"},
                {"title": "D", "content": "d"}
            ],
            "metadata": {"estimated_duration": 40}
        })
    }

    fn start(manager: &SessionManager<Arc<MemoryDocumentStore>>) -> InitializedSession {
        manager
            .initialize("stu-1", "SCI-301", "countries/x", &lesson_data(), &enhancer())
            .unwrap()
    }

    #[test]
    fn test_initialize_writes_both_records() {
        let manager = manager();
        let started = start(&manager);

        assert!(started.session_id.starts_with("session_"));
        assert_eq!(started.lesson.lesson_ref, "SCI-301");

        let session = manager.get_session(&started.session_id).unwrap();
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.progress, 0.0);
        assert_eq!(session.student_id, "stu-1");
        assert!(session.created_at.is_some());
        assert!(session.last_interaction.is_some());

        let state = manager.get_state(&started.session_id).unwrap();
        assert_eq!(state.total_duration, 40.0);
        assert_eq!(state.total_sections, 4);
        assert_eq!(state.time_spent, 0.0);
        assert_eq!(state.learning_path.next_objectives, vec!["one", "two", "three"]);
        assert!(state.last_activity.is_some());
    }

    #[test]
    fn test_initialize_default_duration() {
        let manager = manager();
        let started = manager
            .initialize("stu-1", "L", "p", &json!({}), &enhancer())
            .unwrap();
        assert_eq!(started.state.total_duration, 30.0);
    }

    #[test]
    fn test_initialize_requires_ids() {
        let manager = manager();
        let err = manager
            .initialize(" ", "L", "p", &json!({}), &enhancer())
            .unwrap_err();
        assert!(matches!(err, LecternError::Validation { .. }));
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_pause_then_resume_keeps_reason() {
        let manager = manager();
        let started = start(&manager);
        let paused_at = Utc.with_ymd_and_hms(2025, 1, 18, 10, 0, 0).unwrap();

        manager
            .pause(&started.session_id, Some(paused_at), Some("lunch"))
            .unwrap();
        let paused = manager.get_session(&started.session_id).unwrap();
        assert_eq!(paused.status, SessionStatus::Paused);
        assert_eq!(paused.last_active, Some(paused_at));

        manager.resume(&started.session_id, None).unwrap();
        let resumed = manager.get_session(&started.session_id).unwrap();
        assert_eq!(resumed.status, SessionStatus::Active);
        assert!(resumed.last_resumed.is_some());
        assert_eq!(resumed.pause_reason.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_pause_default_reason() {
        let manager = manager();
        let started = start(&manager);
        manager.pause(&started.session_id, None, None).unwrap();
        let paused = manager.get_session(&started.session_id).unwrap();
        assert_eq!(paused.pause_reason.as_deref(), Some(DEFAULT_PAUSE_REASON));
        assert!(paused.last_active.is_some());
    }

    #[test]
    fn test_pause_unknown_session_is_not_found() {
        let manager = manager();
        let err = manager.pause("session_missing", None, None).unwrap_err();
        assert!(matches!(err, LecternError::NotFound { .. }));
        let err = manager.resume("session_missing", None).unwrap_err();
        assert!(matches!(err, LecternError::NotFound { .. }));
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_record_time_with_zero_target_duration() {
        let manager = manager();
        let started = manager
            .initialize(
                "stu-1",
                "L",
                "p",
                &json!({"metadata": {"estimated_duration": 0}}),
                &enhancer(),
            )
            .unwrap();

        let update = manager.record_time(&started.session_id, 15.0).unwrap();
        assert_eq!(update.time_spent, 15.0);
        assert_eq!(update.engagement_rate, 0.0);
    }

    #[test]
    fn test_record_time_accumulates_and_clamps() {
        let manager = manager();
        let started = start(&manager);

        manager.record_time(&started.session_id, 10.0).unwrap();
        manager.record_time(&started.session_id, -5.0).unwrap();
        let update = manager.record_time(&started.session_id, 10.0).unwrap();

        assert_eq!(update.time_spent, 20.0);
        assert_eq!(update.engagement_rate, 50.0);
        assert_eq!(manager.get_state(&started.session_id).unwrap().time_spent, 20.0);
    }

    #[test]
    fn test_project_time_writes_nothing() {
        let manager = manager();
        let started = start(&manager);
        let projected = manager.project_time(&started.session_id, 12.0).unwrap();
        assert_eq!(projected.time_spent, 12.0);
        assert_eq!(manager.get_state(&started.session_id).unwrap().time_spent, 0.0);
    }

    #[test]
    fn test_complete_section_updates_progress() {
        let manager = manager();
        let started = start(&manager);

        let result = manager.complete_section(&started.session_id, 1).unwrap();
        assert_eq!(result.progress, 25.0);
        assert_eq!(result.state.current_section, 2);

        // Completing the same section twice counts once.
        let result = manager.complete_section(&started.session_id, 1).unwrap();
        assert_eq!(result.progress, 25.0);

        let result = manager.complete_section(&started.session_id, 3).unwrap();
        assert_eq!(result.progress, 50.0);
        assert_eq!(result.state.current_section, 3);

        let session = manager.get_session(&started.session_id).unwrap();
        assert_eq!(session.progress, 50.0);
    }

    #[test]
    fn test_complete_section_out_of_range() {
        let manager = manager();
        let started = start(&manager);
        let err = manager.complete_section(&started.session_id, 4).unwrap_err();
        assert!(matches!(err, LecternError::Validation { .. }));
    }

    #[test]
    fn test_save_progress() {
        let manager = manager();
        let snapshot = manager
            .save_progress("session_1", "user-1", "SCI-301", 42.5)
            .unwrap();
        assert_eq!(snapshot.progress, 42.5);
        assert_eq!(snapshot.user_id, "user-1");
        assert!(snapshot.updated_at.is_some());

        for bad in [-1.0, 100.5, f64::NAN] {
            assert!(manager.save_progress("session_1", "user-1", "SCI-301", bad).is_err());
        }
    }

    #[test]
    fn test_sessions_for_student() {
        let manager = manager();
        start(&manager);
        start(&manager);
        manager
            .initialize("stu-2", "L", "p", &json!({}), &enhancer())
            .unwrap();

        assert_eq!(manager.sessions_for_student("stu-1").unwrap().len(), 2);
        assert_eq!(manager.sessions_for_student("stu-3").unwrap().len(), 0);
    }

    /// Store wrapper that rejects lesson-state writes.
    struct FailingStateStore {
        inner: MemoryDocumentStore,
    }

    impl DocumentStore for FailingStateStore {
        fn get(&self, path: &str) -> Result<Option<Document>> {
            self.inner.get(path)
        }

        fn set(&self, path: &str, document: Document, mode: WriteMode) -> Result<()> {
            if path.starts_with(paths::LESSON_STATES) {
                return Err(LecternError::persistence("disk full"));
            }
            self.inner.set(path, document, mode)
        }

        fn update(&self, path: &str, fields: Document) -> Result<()> {
            self.inner.update(path, fields)
        }

        fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Document)>> {
            self.inner.query(collection, filter)
        }
    }

    #[test]
    fn test_failed_state_write_leaves_orphan_session() {
        let manager = SessionManager::new(FailingStateStore {
            inner: MemoryDocumentStore::new(),
        });

        let err = manager
            .initialize("stu-1", "SCI-301", "p", &lesson_data(), &enhancer())
            .unwrap_err();
        assert!(matches!(err, LecternError::Persistence { .. }));

        // The session record was written and is not rolled back.
        let sessions = manager.sessions_for_student("stu-1").unwrap();
        assert_eq!(sessions.len(), 1);
        let err = manager.get_state(&sessions[0].session_id).unwrap_err();
        assert!(matches!(err, LecternError::NotFound { .. }));
    }
}
