//! Interaction aggregation into per-(student, lesson) analysis documents.
//!
//! Each call reads the stored document, appends one classified interaction,
//! recomputes every metric from the full log and overwrites the document.
//! Calls for the same pair are not serialized: two concurrent calls that
//! both read before either writes lose one interaction.

use chrono::{DateTime, Utc};

use crate::analytics::metrics;
use crate::classify::TaxonomyClassifier;
use crate::core::{
    AnalysisDocument, InteractionInput, InteractionRecord, TaxonomyHistogram, TimeOnTask,
};
use crate::error::Result;
use crate::storage::{paths, DocumentStore, DocumentStoreExt, WriteMode};

/// Folds interactions into analysis documents.
pub struct InteractionAggregator<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> InteractionAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the analysis document, or an empty one if none exists yet.
    pub fn load(&self, student_id: &str, lesson_ref: &str) -> Result<AnalysisDocument> {
        Ok(self
            .store
            .get_as(&paths::analysis(student_id, lesson_ref))?
            .unwrap_or_else(|| AnalysisDocument::empty(student_id, lesson_ref)))
    }

    /// Classify and record one interaction.
    ///
    /// A classifier failure aborts the call before anything is written.
    pub fn record_interaction(
        &self,
        student_id: &str,
        lesson_ref: &str,
        interaction: InteractionInput,
        time: TimeOnTask,
        classifier: &dyn TaxonomyClassifier,
    ) -> Result<AnalysisDocument> {
        self.record_interaction_at(student_id, lesson_ref, interaction, time, classifier, Utc::now())
    }

    /// [`record_interaction`](Self::record_interaction) with an explicit clock.
    pub fn record_interaction_at(
        &self,
        student_id: &str,
        lesson_ref: &str,
        interaction: InteractionInput,
        time: TimeOnTask,
        classifier: &dyn TaxonomyClassifier,
        now: DateTime<Utc>,
    ) -> Result<AnalysisDocument> {
        let mut document = self.load(student_id, lesson_ref)?;

        let classification = classifier.classify(&interaction.text)?;
        tracing::debug!(
            student_id,
            lesson_ref,
            level = %classification.level,
            classifier = classifier.name(),
            "classified interaction"
        );

        document.interactions.push(InteractionRecord::from_input(
            interaction,
            classification.level,
            classification.rationale,
            now,
        ));
        recompute(&mut document, time);
        document.last_updated = Some(now);

        self.store.set_as(
            &paths::analysis(student_id, lesson_ref),
            &document,
            WriteMode::Overwrite,
        )?;

        tracing::info!(
            student_id,
            lesson_ref,
            interactions = document.interactions.len(),
            engagement_rate = document.engagement_rate,
            "recorded interaction"
        );
        Ok(document)
    }
}

/// Recompute every derived metric from the full log.
pub fn recompute(document: &mut AnalysisDocument, time: TimeOnTask) {
    let log = &document.interactions;

    document.time_spent = time.time_spent;
    document.total_duration = time.total_duration;
    document.engagement_rate = metrics::engagement_rate(time.time_spent, time.total_duration);
    document.average_response_time = metrics::average_response_time(log);
    document.tool_usage = metrics::tool_usage_totals(log);
    document.topics_mastered = metrics::topic_union(
        &document.topics_mastered,
        log.iter().flat_map(|r| r.topics_mastered.iter()),
    );
    document.topics_struggled = metrics::topic_union(
        &document.topics_struggled,
        log.iter().flat_map(|r| r.topics_struggled.iter()),
    );
    document.bloom_levels = TaxonomyHistogram::from_levels(log.iter().map(|r| r.taxonomy_level));
}
