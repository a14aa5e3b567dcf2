//! Per-backend configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable consulted when no OpenAI key is configured
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable consulted when no Gemini key is configured
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Settings for every backend
///
/// Loaded from the `[providers]` table of the CLI config:
///
/// ```toml
/// [providers.openai]
/// model = "gpt-4o-mini"
///
/// [providers.gemini]
/// model = "gemini-1.5-flash"
/// timeout_secs = 90
///
/// [providers.ollama]
/// endpoint = "http://localhost:11434"
/// model = "llama3"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// OpenAI chat completions
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Google Gemini
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Local Ollama server
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// OpenAI backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// HTTP timeout per attempt (seconds)
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    pub max_retries: u32,

    /// Base delay between attempts (milliseconds)
    pub retry_backoff_ms: u64,

    /// Longest request accepted (characters)
    pub max_input_chars: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 1_000,
            max_input_chars: 120_000,
        }
    }
}

impl OpenAiConfig {
    /// Configured key, or the environment fallback
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), OPENAI_API_KEY_ENV)
    }

    /// HTTP timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Gemini backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key; falls back to `GEMINI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// HTTP timeout per attempt (seconds)
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    pub max_retries: u32,

    /// Base delay between attempts (milliseconds)
    pub retry_backoff_ms: u64,

    /// Longest request accepted (characters)
    pub max_input_chars: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 1_000,
            max_input_chars: 400_000,
        }
    }
}

impl GeminiConfig {
    /// Configured key, or the environment fallback
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), GEMINI_API_KEY_ENV)
    }

    /// HTTP timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Ollama backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Server URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// HTTP timeout per attempt (seconds)
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    pub max_retries: u32,

    /// Base delay between attempts (milliseconds)
    pub retry_backoff_ms: u64,

    /// Longest request accepted (characters)
    pub max_input_chars: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::ollama::DEFAULT_ENDPOINT.to_string(),
            model: "llama3".to_string(),
            temperature: 0.0,
            timeout_secs: crate::ollama::DEFAULT_TIMEOUT_SECS,
            max_retries: crate::ollama::DEFAULT_MAX_RETRIES,
            retry_backoff_ms: 1_000,
            max_input_chars: 32_000,
        }
    }
}

impl OllamaConfig {
    /// HTTP timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn resolve_key(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| env::var(env_var).ok().filter(|k| !k.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_key_wins() {
        let config = OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            ..OpenAiConfig::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_key_is_ignored() {
        assert_eq!(resolve_key(Some("   "), "NEWSDESK_TEST_UNSET_KEY_VAR"), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: ProviderSettings = toml::from_str(
            r#"
            [gemini]
            timeout_secs = 90

            [ollama]
            model = "mistral"
            "#,
        )
        .unwrap();

        assert_eq!(settings.gemini.timeout_secs, 90);
        assert_eq!(settings.gemini.model, GeminiConfig::default().model);
        assert_eq!(settings.ollama.model, "mistral");
        assert_eq!(settings.ollama.endpoint, crate::ollama::DEFAULT_ENDPOINT);
        assert_eq!(settings.openai, OpenAiConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = ProviderSettings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: ProviderSettings = toml::from_str(&toml_str).unwrap();
        assert_eq!(settings, parsed);
    }
}
