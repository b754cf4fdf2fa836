//! Interaction records and the per-(student, lesson) analysis document.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::taxonomy::{TaxonomyHistogram, TaxonomyLevel};

/// One interaction as submitted by a client, before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionInput {
    /// Free text written or spoken by the student.
    pub text: String,
    /// Minutes spent on this interaction.
    pub duration: f64,
    /// Declared response time in seconds.
    pub response_time: f64,
    /// Usage count per interactive tool.
    pub tool_usage: BTreeMap<String, u64>,
    pub topics_mastered: Vec<String>,
    pub topics_struggled: Vec<String>,
}

impl InteractionInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Duration clamped to be non-negative. NaN counts as zero.
    pub fn clamped_duration(&self) -> f64 {
        clamp_minutes(self.duration)
    }
}

/// Clamp a minute count to be non-negative and finite.
pub fn clamp_minutes(minutes: f64) -> f64 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes
    } else {
        0.0
    }
}

/// An interaction after classification, as stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub text: String,
    pub duration: f64,
    #[serde(default)]
    pub response_time: f64,
    #[serde(default)]
    pub tool_usage: BTreeMap<String, u64>,
    #[serde(default)]
    pub topics_mastered: Vec<String>,
    #[serde(default)]
    pub topics_struggled: Vec<String>,
    pub taxonomy_level: TaxonomyLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl InteractionRecord {
    /// Attach a classification to an input.
    pub fn from_input(
        input: InteractionInput,
        level: TaxonomyLevel,
        rationale: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let duration = input.clamped_duration();
        Self {
            text: input.text,
            duration,
            response_time: input.response_time,
            tool_usage: input.tool_usage,
            topics_mastered: input.topics_mastered,
            topics_struggled: input.topics_struggled,
            taxonomy_level: level,
            rationale,
            recorded_at,
        }
    }
}

/// Time-on-task figures shared between the session manager and the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeOnTask {
    /// Cumulative minutes spent.
    pub time_spent: f64,
    /// Target lesson duration in minutes.
    pub total_duration: f64,
}

/// Running analytics for one student on one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    pub student_id: String,
    pub lesson_ref: String,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default, alias = "avg_response_time")]
    pub average_response_time: f64,
    #[serde(default)]
    pub tool_usage: BTreeMap<String, u64>,
    #[serde(default)]
    pub topics_mastered: BTreeSet<String>,
    #[serde(default)]
    pub topics_struggled: BTreeSet<String>,
    #[serde(default, alias = "bloom_analysis")]
    pub bloom_levels: TaxonomyHistogram,
    #[serde(default)]
    pub time_spent: f64,
    #[serde(default)]
    pub total_duration: f64,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl AnalysisDocument {
    /// An empty document with zeroed metrics.
    pub fn empty(student_id: impl Into<String>, lesson_ref: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            lesson_ref: lesson_ref.into(),
            interactions: Vec::new(),
            engagement_rate: 0.0,
            average_response_time: 0.0,
            tool_usage: BTreeMap::new(),
            topics_mastered: BTreeSet::new(),
            topics_struggled: BTreeSet::new(),
            bloom_levels: TaxonomyHistogram::default(),
            time_spent: 0.0,
            total_duration: 0.0,
            last_updated: None,
        }
    }
}
