//! Lectern - lesson sessions and learning analytics
//!
//! Lectern runs student lesson sessions over a document store: it enhances
//! authored lessons, tracks time and section progress, classifies each
//! interaction on Bloom's taxonomy, and synthesizes end-of-lesson reports
//! through a pluggable text generation service.

pub mod analytics;
pub mod classify;
pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod generation;
pub mod http;
pub mod report;
pub mod session;
pub mod storage;
pub mod util;

pub use analytics::InteractionAggregator;
pub use classify::{
    Classification, ClassificationSource, ClassifierSet, DelegatedClassifier, FallbackClassifier,
    HeuristicClassifier, TaxonomyClassifier,
};
pub use config::{ClassifierStrategy, Config};
pub use content::{Catalog, ContentEnhancer, LessonPlanner};
pub use core::{
    AnalysisDocument, EnhancedLesson, InteractionInput, LessonPath, LessonStateRecord,
    SessionRecord, SessionStatus, TaxonomyLevel,
};
pub use error::{LecternError, Result};
pub use generation::{DisabledGenerator, OllamaGenerator, TextGenerator};
pub use http::{create_router, AppState};
pub use report::{Advisor, NotesWriter, ReportSynthesizer};
pub use session::SessionManager;
pub use storage::{DocumentStore, DocumentStoreExt, FileDocumentStore, MemoryDocumentStore};

// CLI commands
pub use cli::{ClassifyCommand, SessionsCommand, ValidateCommand};
