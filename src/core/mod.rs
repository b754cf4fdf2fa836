//! Core domain types for Lectern.
//!
//! This module contains the lesson, session, analytics and report entities
//! persisted through the document store, plus the cognitive taxonomy.

pub mod analysis;
pub mod lesson;
pub mod report;
pub mod session;
pub mod taxonomy;

pub use analysis::{
    clamp_minutes, AnalysisDocument, InteractionInput, InteractionRecord, TimeOnTask,
};
pub use lesson::{
    DifficultyLevel, EnhancedContent, EnhancedLesson, EnhancedMetadata, LessonDocument,
    LessonMetadata, LessonPath, Quiz, Section, DEFAULT_DURATION_MINUTES,
};
pub use report::{ReportDocument, FINAL_REPORT_TYPE};
pub use session::{
    new_session_id, LearningPath, LessonStateRecord, ProgressSnapshot, SessionRecord,
    SessionStatus, COMPLETION_IN_PROGRESS, DEFAULT_PAUSE_REASON, SESSION_ID_PREFIX,
};
pub use taxonomy::{TaxonomyHistogram, TaxonomyLevel};
