//! Error kinds at the collaborator boundaries

use thiserror::Error;

/// Errors raised by an extraction backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Backend unreachable (DNS, connection refused, TLS)
    #[error("Communication error: {0}")]
    Communication(String),

    /// Backend did not answer within its timeout
    #[error("Request timed out")]
    Timeout,

    /// Backend refused the request
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Body or reason returned by the backend
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available on the backend
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Backend answered with a body we could not read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Backend answered, but with no text
    #[error("Backend returned an empty answer")]
    EmptyAnswer,

    /// Request exceeds the backend's input limit
    #[error("Input too long: {len} chars (max: {max})")]
    InputTooLong {
        /// Request length in characters
        len: usize,
        /// Backend limit in characters
        max: usize,
    },

    /// Backend selected but not set up (missing API key, not registered)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether a provider may sensibly retry the same request
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Communication(_)
            | ProviderError::Timeout
            | ProviderError::RateLimitExceeded => true,
            ProviderError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised while acquiring article text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentFetchError {
    /// Reference cannot be handled by this source
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Network failure reaching the origin
    #[error("Unreachable: {0}")]
    Unreachable(String),

    /// Origin answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Origin took too long to answer
    #[error("Timed out fetching {0}")]
    Timeout(String),

    /// Body could not be decoded as text
    #[error("Could not decode document: {0}")]
    Decode(String),

    /// Document contained no usable text
    #[error("No article text found in {0}")]
    EmptyContent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Timeout.is_transient());
        assert!(ProviderError::Communication("refused".into()).is_transient());
        assert!(ProviderError::Rejected { status: 503, message: "busy".into() }.is_transient());
        assert!(!ProviderError::Rejected { status: 401, message: "bad key".into() }.is_transient());
        assert!(!ProviderError::EmptyAnswer.is_transient());
        assert!(!ProviderError::InputTooLong { len: 10, max: 5 }.is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = ProviderError::InputTooLong { len: 120_000, max: 100_000 };
        assert_eq!(err.to_string(), "Input too long: 120000 chars (max: 100000)");

        let err = ContentFetchError::HttpStatus { status: 404, url: "https://x.io/a".into() };
        assert_eq!(err.to_string(), "HTTP 404 fetching https://x.io/a");
    }
}
