//! Persisted narrative reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report type written by the final report synthesizer.
pub const FINAL_REPORT_TYPE: &str = "final_merged_report";

/// A narrative report for one student on one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub student_id: String,
    pub lesson_ref: String,
    pub report_type: String,
    pub report_content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Human-readable date, e.g. "19 October 2026".
    pub report_date: String,
}
