//! Google Gemini backend

use crate::http::{self, SYSTEM_INSTRUCTION};
use crate::settings::GeminiConfig;
use newsdesk_domain::{ExtractionProvider, ProviderError, ProviderKind};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Provider backed by the Gemini `generateContent` endpoint
pub struct GeminiProvider {
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_answer(self) -> Result<String, ProviderError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ProviderError::Rejected {
                status: 200,
                message: format!("prompt blocked: {}", reason),
            });
        }

        Ok(self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default())
    }
}

impl GeminiProvider {
    /// Create a provider from settings
    ///
    /// # Errors
    /// `NotConfigured` when no API key is configured or exported.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, ProviderError> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "gemini: no api_key configured and {} is not set",
                crate::settings::GEMINI_API_KEY_ENV
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

    fn generate_once(&self, url: &str, request: &str) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: SYSTEM_INSTRUCTION }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: request }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(http::map_reqwest_error)?;

        let parsed: GenerateResponse = http::read_json(response, &self.model)?;
        parsed.into_answer()
    }
}

impl ExtractionProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn extract(&self, request: &str) -> Result<String, ProviderError> {
        http::check_input(request, self.max_input_chars)?;

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!(model = %self.model, "POST {}", url);

        let answer = http::with_retries(self.max_retries, self.retry_backoff, || {
            self.generate_once(&url, request)
        })?;
        http::non_empty(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = GeminiConfig {
            api_key: Some("g-test".to_string()),
            ..GeminiConfig::default()
        };
        let provider = GeminiProvider::from_config(&config).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Gemini);
        assert_eq!(provider.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_request_body_uses_camel_case() {
        let body = GenerateRequest {
            system_instruction: Content { role: None, parts: [Part { text: "s" }] },
            contents: [Content { role: Some("user"), parts: [Part { text: "u" }] }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "u");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_response_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"role": "model", "parts": [{"text": "{\"headline\": "}, {"text": "\"A\"}"}]}, "finishReason": "STOP"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(response.into_answer().unwrap(), r#"{"headline": "A"}"#);
    }

    #[test]
    fn test_blocked_prompt_is_rejected() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(matches!(
            response.into_answer(),
            Err(ProviderError::Rejected { message, .. }) if message.contains("SAFETY")
        ));
    }

    #[test]
    fn test_no_candidates_is_empty() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(response.into_answer().unwrap(), "");
    }
}
