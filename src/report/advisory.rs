//! Advisory text: tutor answers and performance summaries.
//!
//! These paths never fail on the text service. A failed or empty
//! generation degrades to a fixed placeholder.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::FailOpen;
use crate::generation::TextGenerator;

pub const NO_RESPONSE: &str = "No response generated.";
pub const NO_SUMMARY: &str = "No summary generated.";

/// Generates tutor explanations and summaries, failing open.
pub struct Advisor {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Advisor {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Explain something to a student asking about a lesson.
    pub fn tutor(&self, question: &str, lesson_path: &str) -> String {
        let prompt = format!(
            "The student asked: '{}'. Provide a detailed explanation for the lesson '{}'.",
            question, lesson_path
        );
        self.answer(&prompt, "Generating tutor response", NO_RESPONSE)
    }

    /// Summarize a student's performance from analytics data.
    pub fn summary(&self, analytics: &Value) -> String {
        let prompt = format!(
            "Based on this data: {}, create a detailed performance summary.",
            analytics
        );
        self.answer(&prompt, "Generating performance summary", NO_SUMMARY)
    }

    /// Summarize cognitive engagement across taxonomy levels.
    pub fn blooms_summary(&self, bloom: &Value) -> String {
        let prompt = format!(
            "Analyze this data: {}, and summarize cognitive engagement across Bloom's levels.",
            bloom
        );
        self.answer(&prompt, "Generating taxonomy summary", NO_SUMMARY)
    }

    fn answer(&self, prompt: &str, context: &str, placeholder: &str) -> String {
        let text = self
            .generator
            .generate(prompt, self.timeout)
            .map(|text| text.trim().to_string())
            .fail_open_default(context);
        if text.is_empty() {
            placeholder.to_string()
        } else {
            text
        }
    }
}
