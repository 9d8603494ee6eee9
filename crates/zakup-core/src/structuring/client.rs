//! HTTP transport and structuring client.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use super::{LlmTransport, StructuringService, parser, prompt};
use crate::error::StructuringError;
use crate::models::config::StructuringConfig;
use crate::models::offer::StructuredOffer;

/// HTTP client for an Ollama-compatible generation endpoint.
///
/// Holds only a connection-pooled `reqwest` client; safe to share across
/// threads. Every request is bounded by the configured timeout so a stuck
/// service can never hang the pipeline.
pub struct OllamaTransport {
    base_url: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl OllamaTransport {
    /// Create a transport for the given endpoint and model.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: StructuringConfig::default().temperature,
            timeout_secs,
            client,
        }
    }

    /// Create a transport from configuration.
    pub fn from_config(config: &StructuringConfig) -> Self {
        let mut transport = Self::new(&config.base_url, &config.model, config.timeout_secs);
        transport.temperature = config.temperature;
        transport
    }
}

/// Request body for /api/generate.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response body from /api/generate.
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LlmTransport for OllamaTransport {
    fn generate(&self, prompt: &str, system: &str) -> Result<String, StructuringError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            format: "json",
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                StructuringError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                StructuringError::Timeout(self.timeout_secs)
            } else {
                StructuringError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| StructuringError::MalformedResponse(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Structuring client: prompt construction, one transport call, then
/// strict parse-and-validate of the response.
pub struct StructuringClient<T: LlmTransport> {
    transport: T,
}

impl<T: LlmTransport> StructuringClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: LlmTransport> StructuringService for StructuringClient<T> {
    fn structure(
        &self,
        text: &str,
        file_name: &str,
    ) -> Result<StructuredOffer, StructuringError> {
        let request = prompt::build_offer_prompt(text, file_name);
        let raw = self
            .transport
            .generate(&request, prompt::OFFER_SYSTEM_PROMPT)?;
        debug!("structuring service returned {} bytes", raw.len());
        let parsed = parser::parse_offer_response(&raw)?;
        Ok(parser::validate_offer(parsed))
    }
}

/// Structuring service that is switched off; every call reports failure so
/// the pipeline takes the fallback path.
pub struct DisabledStructuring;

impl StructuringService for DisabledStructuring {
    fn structure(&self, _: &str, _: &str) -> Result<StructuredOffer, StructuringError> {
        Err(StructuringError::Disabled)
    }
}

/// Mock transport for tests: returns a configured response or fails, and
/// counts calls.
pub struct MockTransport {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl MockTransport {
    /// Transport that answers every generate call with `response`.
    pub fn replying(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Transport that fails every generate call.
    pub fn failing() -> Self {
        Self {
            response: Err("mock transport failure".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmTransport for MockTransport {
    fn generate(&self, _prompt: &str, _system: &str) -> Result<String, StructuringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(reason) => Err(StructuringError::Http(reason.clone())),
        }
    }
}
