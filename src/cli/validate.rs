//! Validate command for Lectern.
//!
//! Checks an authored lesson file against the lesson schema and, for a
//! grade, the required vocabulary band.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{lesson_text, validate_required_vocabulary, validate_schema, Catalog};
use crate::error::LecternError;
use crate::util::read_json_file;

/// Options for the validate command.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Output as JSON.
    pub json: bool,
    /// Grade whose vocabulary band is enforced; skipped when absent.
    pub grade: Option<String>,
}

/// Output format for the validate command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateOutput {
    /// Whether validation ran to completion.
    pub success: bool,
    /// Whether the lesson passed every check.
    pub valid: bool,
    pub violations: Vec<String>,
    pub missing_verbs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateOutput {
    fn checked(violations: Vec<String>, missing_verbs: Vec<String>) -> Self {
        Self {
            success: true,
            valid: violations.is_empty() && missing_verbs.is_empty(),
            violations,
            missing_verbs,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            valid: false,
            violations: vec![],
            missing_verbs: vec![],
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Validation failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }
        if self.valid {
            return "Lesson is valid.".to_string();
        }

        let mut lines = vec!["Lesson is invalid:".to_string()];
        for violation in &self.violations {
            lines.push(format!("  - {}", violation));
        }
        if !self.missing_verbs.is_empty() {
            lines.push(format!(
                "  - missing required verbs: {}",
                self.missing_verbs.join(", ")
            ));
        }
        lines.join("\n")
    }
}

/// The validate command implementation.
pub struct ValidateCommand {
    catalog: Arc<Catalog>,
}

impl ValidateCommand {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Validate a lesson file.
    pub fn run_file(&self, path: &Path, options: &ValidateOptions) -> ValidateOutput {
        match read_json_file(path) {
            Ok(lesson) => self.run(&lesson, options),
            Err(e) => ValidateOutput::failure(e.to_string()),
        }
    }

    /// Validate a parsed lesson. Both checks always run.
    pub fn run(&self, lesson: &Value, options: &ValidateOptions) -> ValidateOutput {
        let violations = match validate_schema(lesson) {
            Ok(()) => vec![],
            Err(violations) => violations.iter().map(ToString::to_string).collect(),
        };

        let missing_verbs = match options.grade.as_deref() {
            None => vec![],
            Some(grade) => {
                match validate_required_vocabulary(&self.catalog, &lesson_text(lesson), grade) {
                    Ok(()) => vec![],
                    Err(LecternError::MissingVocabulary { missing, .. }) => missing,
                    Err(e) => return ValidateOutput::failure(e.to_string()),
                }
            }
        };

        ValidateOutput::checked(violations, missing_verbs)
    }
}
