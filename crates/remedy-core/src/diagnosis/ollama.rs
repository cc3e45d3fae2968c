//! Diagnosis generator backed by a local Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::task;

use super::{prompt, DiagnosisGenerator, PromptInputs};
use crate::error::GeneratorError;

pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Calls Ollama's `/api/generate` endpoint.
///
/// Only loopback URLs on `127.0.0.1` are accepted so incident data never
/// leaves the machine.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, GeneratorError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let local = base_url == "http://127.0.0.1"
            || base_url
                .strip_prefix("http://127.0.0.1:")
                .is_some_and(|port| !port.is_empty() && port.parse::<u16>().is_ok());
        if !local {
            return Err(GeneratorError::Configuration {
                message: format!("Ollama base URL must be http://127.0.0.1[:port], got '{base_url}'"),
            });
        }

        let model = model.into();
        if model.trim().is_empty() {
            return Err(GeneratorError::Configuration {
                message: "model name must not be blank".to_string(),
            });
        }

        Ok(Self {
            base_url,
            model,
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        let response = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(&request)
            .map_err(|e| GeneratorError::Unavailable {
                message: e.to_string(),
            })?;

        let body: GenerateResponse =
            response
                .into_json()
                .map_err(|e| GeneratorError::Unavailable {
                    message: format!("failed to decode Ollama response: {e}"),
                })?;

        if body.response.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(body.response)
    }
}

#[async_trait]
impl DiagnosisGenerator for OllamaGenerator {
    async fn propose(&self, inputs: &PromptInputs) -> Result<String, GeneratorError> {
        let prompt = prompt::render(inputs);
        debug!(
            "Requesting diagnosis from {} ({} prompt bytes)",
            self.model,
            prompt.len()
        );

        let generator = self.clone();
        task::spawn_blocking(move || generator.generate(&prompt))
            .await
            .map_err(|e| GeneratorError::Unavailable {
                message: format!("Task join error: {e}"),
            })?
    }
}
