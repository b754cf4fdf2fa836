//! Unified error types for Lectern.
//!
//! Errors fall into four classes that the HTTP layer translates into status
//! codes: validation, not-found, upstream (text generation) and persistence.
//! Advisory paths (tutoring answers, summaries, text simplification) use the
//! [`FailOpen`] helpers to degrade to placeholder values instead of failing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Lectern operations.
#[derive(Error, Debug)]
pub enum LecternError {
    /// Missing or malformed input.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Lesson content lacks the verbs required for its grade band.
    #[error("lesson content missing required verbs for {grade}: {}", .missing.join(", "))]
    MissingVocabulary { grade: String, missing: Vec<String> },

    /// A lesson, session or lesson state could not be resolved.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The delegated taxonomy classifier could not produce a level.
    #[error("classification unavailable: {message}")]
    ClassificationUnavailable { message: String },

    /// The text generation service failed or timed out.
    #[error("{service} error: {message}")]
    Upstream { service: String, message: String },

    /// I/O errors from file-backed document storage.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Document store failures that are not plain I/O.
    #[error("persistence error: {message}")]
    Persistence { message: String },

    /// JSON or TOML (de)serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for Lectern operations.
pub type Result<T> = std::result::Result<T, LecternError>;

/// Coarse error classes used at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    Upstream,
    Persistence,
}

impl LecternError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a missing vocabulary error.
    pub fn missing_vocabulary(grade: impl Into<String>, missing: Vec<String>) -> Self {
        Self::MissingVocabulary {
            grade: grade.into(),
            missing,
        }
    }

    /// Create a not found error for the given entity kind.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a classification unavailable error.
    pub fn classification_unavailable(message: impl Into<String>) -> Self {
        Self::ClassificationUnavailable {
            message: message.into(),
        }
    }

    /// Create an upstream service error.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation { .. } | Self::MissingVocabulary { .. } => ErrorClass::Validation,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::ClassificationUnavailable { .. } | Self::Upstream { .. } => ErrorClass::Upstream,
            Self::Storage { .. }
            | Self::Persistence { .. }
            | Self::Serde { .. }
            | Self::Config { .. } => ErrorClass::Persistence,
        }
    }
}

impl From<io::Error> for LecternError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for LecternError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling on advisory paths.
///
/// Logs the error and substitutes a fallback value.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the Lectern CLI.
pub mod exit_codes {
    /// Command completed successfully.
    pub const SUCCESS: i32 = 0;

    /// Command failed.
    pub const ERROR: i32 = 1;
}
