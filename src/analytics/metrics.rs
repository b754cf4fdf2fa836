//! Pure metric functions over lesson state and interaction logs.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{clamp_minutes, InteractionRecord};

/// Percentage of the target duration actually spent, capped at 100.
///
/// Zero when the target duration is zero, negative or not finite.
pub fn engagement_rate(time_spent: f64, total_duration: f64) -> f64 {
    if !total_duration.is_finite() || total_duration <= 0.0 {
        return 0.0;
    }
    (clamp_minutes(time_spent) / total_duration * 100.0).min(100.0)
}

/// Completed sections as a percentage of all sections; zero without sections.
pub fn progress_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed.min(total) as f64 / total as f64 * 100.0
}

/// Mean declared response time; zero for an empty log.
///
/// Negative or non-finite declarations count as zero.
pub fn average_response_time(log: &[InteractionRecord]) -> f64 {
    if log.is_empty() {
        return 0.0;
    }
    let sum: f64 = log
        .iter()
        .map(|record| clamp_minutes(record.response_time))
        .sum();
    sum / log.len() as f64
}

/// Usage totals per tool across the whole log.
pub fn tool_usage_totals(log: &[InteractionRecord]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for record in log {
        for (tool, count) in &record.tool_usage {
            let total: &mut u64 = totals.entry(tool.clone()).or_default();
            *total = total.saturating_add(*count);
        }
    }
    totals
}

/// Union of previously stored topics with every topic declared in the log.
pub fn topic_union<'a>(
    stored: &BTreeSet<String>,
    declared: impl Iterator<Item = &'a String>,
) -> BTreeSet<String> {
    let mut topics = stored.clone();
    topics.extend(
        declared
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    );
    topics
}
