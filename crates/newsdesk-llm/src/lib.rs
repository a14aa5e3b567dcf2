//! Newsdesk LLM Provider Layer
//!
//! Interchangeable extraction backends behind the `ExtractionProvider` trait
//! from `newsdesk-domain`.
//!
//! # Providers
//!
//! - `OpenAiProvider`: OpenAI chat completions
//! - `GeminiProvider`: Google Gemini generateContent
//! - `OllamaProvider`: Local Ollama API integration
//! - `MockProvider`: Deterministic mock for testing
//!
//! Every provider is blocking: one `extract` call issues one logical request
//! (plus its own transient-error retries) and returns the backend's raw text.
//!
//! # Examples
//!
//! ```
//! use newsdesk_llm::MockProvider;
//! use newsdesk_domain::ExtractionProvider;
//!
//! let provider = MockProvider::new(r#"{"headline": "Hello"}"#);
//! let answer = provider.extract("any request").unwrap();
//! assert_eq!(answer, r#"{"headline": "Hello"}"#);
//! ```

#![warn(missing_docs)]

mod http;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod registry;
pub mod settings;

use newsdesk_domain::{ExtractionProvider, ProviderError, ProviderKind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;
pub use settings::{GeminiConfig, OllamaConfig, OpenAiConfig, ProviderSettings};

/// Mock provider for deterministic testing
///
/// Returns pre-configured answers without making any network calls. Specific
/// answers are matched by substring, so a test can key them on a phrase from
/// the article text rather than on the whole generated prompt.
///
/// # Examples
///
/// ```
/// use newsdesk_llm::MockProvider;
/// use newsdesk_domain::{ExtractionProvider, ProviderError};
///
/// // Simple fixed answer
/// let provider = MockProvider::new("summary: fixed");
/// assert_eq!(provider.extract("any request").unwrap(), "summary: fixed");
///
/// // Answers keyed on request content
/// let mut provider = MockProvider::default();
/// provider.add_response("Acme", "headline: Acme");
/// provider.add_error("Globex", ProviderError::Timeout);
/// assert_eq!(provider.extract("... Acme ...").unwrap(), "headline: Acme");
/// assert_eq!(provider.extract("... Globex ..."), Err(ProviderError::Timeout));
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    model: String,
    default_response: Result<String, ProviderError>,
    responses: Arc<Mutex<Vec<(String, Result<String, ProviderError>)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a MockProvider with a fixed answer for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Ok(response.into()))
    }

    /// Create a MockProvider that fails every request with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_response: Result<String, ProviderError>) -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            model: "mock".to_string(),
            default_response,
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Report a different backend kind (default: OpenAI)
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Answer requests containing `needle` with `response`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((needle.into(), Ok(response.into())));
    }

    /// Fail requests containing `needle` with `error`
    pub fn add_error(&mut self, needle: impl Into<String>, error: ProviderError) {
        lock(&self.responses).push((needle.into(), Err(error)));
    }

    /// Get the number of times extract was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<String> {
        lock(&self.requests).last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ExtractionProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn extract(&self, request: &str) -> Result<String, ProviderError> {
        lock(&self.requests).push(request.to_string());

        let configured = lock(&self.responses)
            .iter()
            .find(|(needle, _)| request.contains(needle.as_str()))
            .map(|(_, response)| response.clone());

        let answer = configured.unwrap_or_else(|| self.default_response.clone())?;
        http::non_empty(answer)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.extract("any request");
        assert_eq!(result, Ok("Test response".to_string()));
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.extract("say hello").unwrap(), "world");
        assert_eq!(provider.extract("foo?").unwrap(), "bar");
        assert_eq!(provider.extract("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.extract("request1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.extract("request2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_request().as_deref(), Some("request2"));

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad", ProviderError::Communication("unreachable".into()));

        let result = provider.extract("bad request");
        assert!(matches!(result, Err(ProviderError::Communication(_))));
    }

    #[test]
    fn test_mock_provider_failing() {
        let provider = MockProvider::failing(ProviderError::RateLimitExceeded);
        assert_eq!(provider.extract("x"), Err(ProviderError::RateLimitExceeded));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_mock_provider_empty_answer() {
        let provider = MockProvider::new("   ");
        assert_eq!(provider.extract("x"), Err(ProviderError::EmptyAnswer));
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.extract("test").unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
