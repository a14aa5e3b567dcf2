//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API, for running extraction
//! against a local model instead of a hosted one.
//!
//! # Features
//!
//! - Blocking HTTP communication with the Ollama generate API
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use newsdesk_llm::OllamaProvider;
//! use newsdesk_domain::ExtractionProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! let answer = provider.extract("Extract the headline from: ...").unwrap();
//! ```

use crate::http::{self, SYSTEM_INSTRUCTION};
use crate::settings::OllamaConfig;
use newsdesk_domain::{ExtractionProvider, ProviderError, ProviderKind};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (120 seconds; local models are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: Client,
    temperature: f32,
    max_retries: u32,
    retry_backoff: Duration,
    max_input_chars: usize,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::from_config(&OllamaConfig {
            endpoint: endpoint.into(),
            model: model.into(),
            ..OllamaConfig::default()
        })
    }

    /// Create a provider on the default endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Create a provider from settings
    pub fn from_config(config: &OllamaConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client: http::build_client(config.timeout())?,
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            max_input_chars: config.max_input_chars,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn generate_once(&self, url: &str, request: &str) -> Result<String, ProviderError> {
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: request,
            system: SYSTEM_INSTRUCTION,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .map_err(http::map_reqwest_error)?;

        let parsed: OllamaGenerateResponse = http::read_json(response, &self.model)?;
        Ok(parsed.response)
    }
}

impl ExtractionProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn extract(&self, request: &str) -> Result<String, ProviderError> {
        http::check_input(request, self.max_input_chars)?;

        let url = format!("{}/api/generate", self.endpoint);
        debug!(model = %self.model, "POST {}", url);

        let answer = http::with_retries(self.max_retries, self.retry_backoff, || {
            self.generate_once(&url, request)
        })?;
        http::non_empty(answer)
    }
}
