//! CLI commands for Lectern.
//!
//! Each command returns a structured output that prints as JSON or text:
//! - **classify**: run text through a taxonomy classifier
//! - **validate**: check an authored lesson file
//! - **sessions**: list a student's lesson sessions
//!
//! `serve` lives in the binary since it only wires the HTTP router.

pub mod classify;
pub mod sessions;
pub mod validate;

pub use classify::{ClassifyCommand, ClassifyOptions, ClassifyOutput};
pub use sessions::{SessionSummary, SessionsCommand, SessionsOptions, SessionsOutput};
pub use validate::{ValidateCommand, ValidateOptions, ValidateOutput};
