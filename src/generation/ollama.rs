//! Ollama-compatible text generation over HTTP.

use std::time::Duration;

use serde_json::Value;

use crate::config::GenerationConfig;
use crate::error::{LecternError, Result};
use crate::generation::traits::{TextGenerator, SERVICE_NAME};

/// Client for the Ollama `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(&config.base_url, &config.model)
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

/// Extract the generated text from an Ollama response body.
pub(crate) fn parse_response(body: &str) -> Result<String> {
    let json: Value = serde_json::from_str(body).map_err(|e| {
        LecternError::upstream(SERVICE_NAME, format!("unparseable response: {}", e))
    })?;

    if let Some(message) = json.get("error").and_then(Value::as_str) {
        return Err(LecternError::upstream(SERVICE_NAME, message));
    }

    json.get("response")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .ok_or_else(|| LecternError::upstream(SERVICE_NAME, "missing 'response' field"))
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "calling text generation");

        let resp = agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    LecternError::upstream(SERVICE_NAME, format!("HTTP status {}", code))
                }
                ureq::Error::Transport(t) => {
                    let message = t.to_string();
                    if message.contains("timed out") {
                        LecternError::upstream(
                            SERVICE_NAME,
                            format!("timed out after {}s", timeout.as_secs()),
                        )
                    } else {
                        LecternError::upstream(SERVICE_NAME, message)
                    }
                }
            })?;

        let resp_str = resp
            .into_string()
            .map_err(|e| LecternError::upstream(SERVICE_NAME, e.to_string()))?;

        parse_response(&resp_str)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_success() {
        let text = parse_response(r#"{"model":"llama3.2","response":"Level: applying","done":true}"#)
            .unwrap();
        assert_eq!(text, "Level: applying");
    }

    #[test]
    fn test_parse_response_error_field() {
        let err = parse_response(r#"{"error":"model 'x' not found"}"#).unwrap_err();
        assert!(matches!(err, LecternError::Upstream { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_parse_response_missing_field() {
        assert!(parse_response(r#"{"done":true}"#).is_err());
        assert!(parse_response("<html>").is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let generator = OllamaGenerator::new("http://localhost:11434/", "llama3.2");
        assert_eq!(generator.endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_unreachable_server_is_upstream_error() {
        // Port 9 (discard) is not served in test environments.
        let generator = OllamaGenerator::new("http://127.0.0.1:9", "llama3.2");
        let err = generator
            .generate("hello", Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, LecternError::Upstream { .. }));
    }
}
