//! Generative text service clients.
//!
//! Every prose-producing path (delegated classification, reports, lesson
//! plans, tutoring, summaries, simplification) goes through [`TextGenerator`].

pub mod disabled;
pub mod ollama;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use disabled::DisabledGenerator;
pub use ollama::OllamaGenerator;
pub use traits::{TextGenerator, SERVICE_NAME};

use crate::config::GenerationConfig;

/// Build the generator selected by configuration.
pub fn build_generator(config: &GenerationConfig) -> Arc<dyn TextGenerator> {
    if config.enabled {
        tracing::info!(url = %config.base_url, model = %config.model, "text generation enabled");
        Arc::new(OllamaGenerator::from_config(config))
    } else {
        tracing::info!("text generation disabled");
        Arc::new(DisabledGenerator)
    }
}

/// Per-call timeout from configuration.
pub fn call_timeout(config: &GenerationConfig) -> Duration {
    Duration::from_secs(config.timeout_secs)
}

/// Scripted generator for tests.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::error::{LecternError, Result};
    use crate::generation::{TextGenerator, SERVICE_NAME};

    /// Replays queued responses, then repeats a fallback response.
    #[derive(Debug)]
    pub struct ScriptedGenerator {
        queue: Mutex<VecDeque<std::result::Result<String, String>>>,
        fallback: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        /// Always answer `text`.
        pub fn always(text: impl Into<String>) -> Self {
            Self::with_fallback(Ok(text.into()))
        }

        /// Always fail with `message`.
        pub fn failing(message: impl Into<String>) -> Self {
            Self::with_fallback(Err(message.into()))
        }

        /// Answer from `responses` in order, then fail.
        pub fn sequence(responses: Vec<std::result::Result<String, String>>) -> Self {
            let generator = Self::with_fallback(Err("script exhausted".to_string()));
            *generator.queue.lock().unwrap() = responses.into();
            generator
        }

        fn with_fallback(fallback: std::result::Result<String, String>) -> Self {
            Self {
                queue: Mutex::new(VecDeque::new()),
                fallback,
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Prompts received so far.
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, prompt: &str, _timeout: Duration) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let next = self
                .queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            next.map_err(|message| LecternError::upstream(SERVICE_NAME, message))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }
}
