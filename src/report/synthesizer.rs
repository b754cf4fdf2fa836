//! Final lesson report synthesis.
//!
//! One prompt merges the analytics and taxonomy summaries; the generated
//! text is wrapped in a fixed heading block and merge-written to
//! `student_reports/{student_id}_{lesson_ref}`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::{ReportDocument, FINAL_REPORT_TYPE};
use crate::error::{LecternError, Result};
use crate::generation::TextGenerator;
use crate::storage::{paths, server_timestamp, to_document, DocumentStore, DocumentStoreExt, WriteMode};

/// Date format used in report headings, e.g. "18 January 2025".
pub const REPORT_DATE_FORMAT: &str = "%d %B %Y";

pub fn report_date(now: DateTime<Utc>) -> String {
    now.format(REPORT_DATE_FORMAT).to_string()
}

fn render(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Build the report prompt.
pub fn report_prompt(
    student_id: &str,
    lesson_ref: &str,
    date: &str,
    analytics: &Value,
    bloom: &Value,
) -> String {
    format!(
        "You are generating a final lesson summary for student '{}' on lesson '{}' dated {}. \
         The data below is strictly about a student's classroom performance.\n\n\
         Analytics Data: {}\n\
         Bloom's Taxonomy Data: {}\n\n\
         Please produce a single comprehensive summary discussing:\n\
         1. The student's overall performance and engagement (use the analytics data).\n\
         2. The student's cognitive engagement across Bloom's levels (use the taxonomy data).\n\
         3. Keep the report short, direct, and educational.\n\
         4. Conclude by re-stating the lesson reference and today's date.\n",
        student_id,
        lesson_ref,
        date,
        render(analytics),
        render(bloom)
    )
}

/// Wrap generated text in the report heading block.
pub fn wrap_report(lesson_ref: &str, date: &str, body: &str) -> String {
    format!(
        "=== Final Lesson Report ===\nLesson Reference: {}\nDate: {}\n\n{}\n",
        lesson_ref, date, body
    )
}

/// Generates and persists final lesson reports.
pub struct ReportSynthesizer<S: DocumentStore> {
    store: S,
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl<S: DocumentStore> ReportSynthesizer<S> {
    pub fn new(store: S, generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            store,
            generator,
            timeout,
        }
    }

    /// Generate, wrap and persist the final report; returns the wrapped text.
    ///
    /// A generation failure is returned to the caller and nothing is written.
    pub fn generate_final_report(
        &self,
        student_id: &str,
        lesson_ref: &str,
        analytics: &Value,
        bloom: &Value,
    ) -> Result<String> {
        self.generate_final_report_at(student_id, lesson_ref, analytics, bloom, Utc::now())
    }

    /// [`generate_final_report`](Self::generate_final_report) with an explicit clock.
    pub fn generate_final_report_at(
        &self,
        student_id: &str,
        lesson_ref: &str,
        analytics: &Value,
        bloom: &Value,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let date = report_date(now);
        let prompt = report_prompt(student_id, lesson_ref, &date, analytics, bloom);

        let body = self
            .generator
            .generate(&prompt, self.timeout)
            .inspect_err(|err| tracing::error!(student_id, lesson_ref, error = %err, "report generation failed"))?;
        let report = wrap_report(lesson_ref, &date, body.trim());

        let record = ReportDocument {
            student_id: student_id.to_string(),
            lesson_ref: lesson_ref.to_string(),
            report_type: FINAL_REPORT_TYPE.to_string(),
            report_content: report.clone(),
            created_at: None,
            report_date: date,
        };
        let mut document = to_document(&record)?;
        document.insert("created_at".into(), server_timestamp());
        self.store
            .set(&paths::report(student_id, lesson_ref), document, WriteMode::Merge)?;

        tracing::info!(student_id, lesson_ref, chars = report.len(), "saved final report");
        Ok(report)
    }

    /// Read a stored report.
    pub fn get_report(&self, student_id: &str, lesson_ref: &str) -> Result<ReportDocument> {
        self.store
            .get_as(&paths::report(student_id, lesson_ref))?
            .ok_or_else(|| LecternError::not_found("report", paths::pair_id(student_id, lesson_ref)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedGenerator;
    use crate::storage::MemoryDocumentStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 18, 9, 30, 0).unwrap()
    }

    fn synthesizer(
        store: Arc<MemoryDocumentStore>,
        generator: ScriptedGenerator,
    ) -> (ReportSynthesizer<Arc<MemoryDocumentStore>>, Arc<ScriptedGenerator>) {
        let generator = Arc::new(generator);
        (
            ReportSynthesizer::new(store, generator.clone(), Duration::from_secs(30)),
            generator,
        )
    }

    #[test]
    fn test_report_date_format() {
        assert_eq!(report_date(now()), "18 January 2025");
    }

    #[test]
    fn test_prompt_embeds_both_summaries() {
        let prompt = report_prompt(
            "stu-1",
            "SCI-301",
            "18 January 2025",
            &json!({"engagement_rate": 50}),
            &json!("mostly understanding"),
        );
        assert!(prompt.contains("Analytics Data: {\"engagement_rate\":50}"));
        assert!(prompt.contains("Bloom's Taxonomy Data: mostly understanding"));
        assert!(prompt.contains("re-stating the lesson reference"));
    }

    #[test]
    fn test_report_wrapped_and_persisted() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (synthesizer, generator) =
            synthesizer(store.clone(), ScriptedGenerator::always("Great progress.\n"));

        let report = synthesizer
            .generate_final_report_at("stu-1", "SCI-301", &json!({"a": 1}), &json!({"b": 2}), now())
            .unwrap();

        assert_eq!(
            report,
            "=== Final Lesson Report ===\nLesson Reference: SCI-301\nDate: 18 January 2025\n\nGreat progress.\n"
        );
        assert!(generator.prompts()[0].contains("dated 18 January 2025"));

        let stored = synthesizer.get_report("stu-1", "SCI-301").unwrap();
        assert_eq!(stored.report_type, FINAL_REPORT_TYPE);
        assert_eq!(stored.report_content, report);
        assert_eq!(stored.report_date, "18 January 2025");
        assert!(stored.created_at.is_some());
    }

    #[test]
    fn test_merge_preserves_other_fields() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .set(
                "student_reports/stu-1_SCI-301",
                json!({"teacher_note": "keep"}).as_object().cloned().unwrap(),
                WriteMode::Overwrite,
            )
            .unwrap();
        let (synthesizer, _) = synthesizer(store.clone(), ScriptedGenerator::always("ok"));

        synthesizer
            .generate_final_report_at("stu-1", "SCI-301", &json!({}), &json!({}), now())
            .unwrap();

        let stored = store.get("student_reports/stu-1_SCI-301").unwrap().unwrap();
        assert_eq!(stored["teacher_note"], "keep");
        assert_eq!(stored["report_type"], FINAL_REPORT_TYPE);
    }

    #[test]
    fn test_generation_failure_writes_nothing() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (synthesizer, _) = synthesizer(store.clone(), ScriptedGenerator::failing("timed out"));

        let err = synthesizer
            .generate_final_report_at("stu-1", "SCI-301", &json!({}), &json!({}), now())
            .unwrap_err();
        assert!(matches!(err, LecternError::Upstream { .. }));
        assert!(store.is_empty());
    }
}
