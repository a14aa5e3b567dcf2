//! OpenAI chat completions backend

use crate::http::{self, SYSTEM_INSTRUCTION};
use crate::settings::OpenAiConfig;
use newsdesk_domain::{ExtractionProvider, ProviderError, ProviderKind};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Provider backed by the OpenAI `/chat/completions` endpoint
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
    temperature: f32,
    max_retries: u32,
    retry_backoff: Duration,
    max_input_chars: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_answer(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
    }
}

impl OpenAiProvider {
    /// Create a provider from settings
    ///
    /// # Errors
    /// `NotConfigured` when no API key is configured or exported.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, ProviderError> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "openai: no api_key configured and {} is not set",
                crate::settings::OPENAI_API_KEY_ENV
            ))
        })?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client: http::build_client(config.timeout())?,
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            max_input_chars: config.max_input_chars,
        })
    }

    fn complete_once(&self, url: &str, request: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_INSTRUCTION },
                ChatMessage { role: "user", content: request },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(http::map_reqwest_error)?;

        let parsed: ChatResponse = http::read_json(response, &self.model)?;
        Ok(parsed.into_answer())
    }
}

impl ExtractionProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn extract(&self, request: &str) -> Result<String, ProviderError> {
        http::check_input(request, self.max_input_chars)?;

        let url = format!("{}/chat/completions", self.endpoint);
        debug!(model = %self.model, "POST {}", url);

        let answer = http::with_retries(self.max_retries, self.retry_backoff, || {
            self.complete_once(&url, request)
        })?;
        http::non_empty(answer)
    }
}
