//! Interaction analytics.
//!
//! Pure metric functions plus the aggregator that folds classified
//! interactions into per-(student, lesson) analysis documents.

pub mod aggregator;
pub mod metrics;

pub use aggregator::{recompute, InteractionAggregator};
pub use metrics::{
    average_response_time, engagement_rate, progress_percentage, tool_usage_totals, topic_union,
};
