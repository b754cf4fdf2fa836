//! Generator used when text generation is switched off.

use std::time::Duration;

use crate::error::{LecternError, Result};
use crate::generation::traits::{TextGenerator, SERVICE_NAME};

/// Fails every call as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String> {
        Err(LecternError::upstream(SERVICE_NAME, "disabled by configuration"))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
