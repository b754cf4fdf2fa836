//! Text generation trait.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Service name used in upstream errors.
pub const SERVICE_NAME: &str = "text generation";

/// A generative text service.
///
/// Given a prompt and a timeout, returns free text or fails with
/// `LecternError::Upstream`. Calls are synchronous and never retried.
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`, giving up after `timeout`.
    fn generate(&self, prompt: &str, timeout: Duration) -> Result<String>;

    /// Name of this generator for logging.
    fn name(&self) -> &'static str;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        (**self).generate(prompt, timeout)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
