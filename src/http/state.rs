//! Shared application state for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use crate::analytics::InteractionAggregator;
use crate::classify::ClassifierSet;
use crate::config::Config;
use crate::content::{Catalog, ContentEnhancer, GeneratedSimplifier, LessonPlanner};
use crate::error::Result;
use crate::generation::{build_generator, call_timeout, TextGenerator};
use crate::report::{Advisor, NotesWriter, ReportSynthesizer};
use crate::session::SessionManager;
use crate::storage::{open_store, DocumentStore};

/// Shared store handle used by every component behind the server.
pub type SharedStore = Arc<dyn DocumentStore>;

/// State shared by all handlers.
///
/// Components are cheap views over these handles and are built per request;
/// nothing here holds per-request data.
pub struct AppState {
    pub store: SharedStore,
    pub generator: Arc<dyn TextGenerator>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<Config>,
    pub classifiers: ClassifierSet,
}

impl AppState {
    pub fn new(config: Config, store: SharedStore, generator: Arc<dyn TextGenerator>) -> Self {
        let catalog = Arc::new(config.catalog.clone());
        let classifiers = ClassifierSet::new(
            config.classifier.strategy,
            catalog.clone(),
            generator.clone(),
            call_timeout(&config.generation),
        );
        Self {
            store,
            generator,
            catalog,
            config: Arc::new(config),
            classifiers,
        }
    }

    /// Open the configured store and generator.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = open_store(&config.store)?;
        let generator = build_generator(&config.generation);
        Ok(Self::new(config, store, generator))
    }

    /// Upper bound on one request's blocking work.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.request_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        call_timeout(&self.config.generation)
    }

    pub fn sessions(&self) -> SessionManager<SharedStore> {
        SessionManager::new(self.store.clone())
    }

    pub fn aggregator(&self) -> InteractionAggregator<SharedStore> {
        InteractionAggregator::new(self.store.clone())
    }

    pub fn enhancer(&self) -> ContentEnhancer {
        ContentEnhancer::new(self.catalog.clone())
            .with_default_duration(self.config.content.default_duration_minutes)
    }

    pub fn simplifier(&self) -> GeneratedSimplifier {
        GeneratedSimplifier::new(self.generator.clone(), self.generation_timeout())
    }

    pub fn planner(&self) -> LessonPlanner {
        LessonPlanner::new(self.generator.clone(), self.generation_timeout())
    }

    pub fn reports(&self) -> ReportSynthesizer<SharedStore> {
        ReportSynthesizer::new(
            self.store.clone(),
            self.generator.clone(),
            self.generation_timeout(),
        )
    }

    pub fn notes(&self) -> NotesWriter<SharedStore> {
        NotesWriter::new(
            self.store.clone(),
            self.generator.clone(),
            self.generation_timeout(),
        )
    }

    pub fn advisor(&self) -> Advisor {
        Advisor::new(self.generator.clone(), self.generation_timeout())
    }
}
