//! Error types for the extraction pipeline

use newsdesk_domain::{ContentFetchError, ProviderError};
use thiserror::Error;

/// The answer held nothing the pipeline could use
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not a single requested field could be read from the answer
    #[error("No recognized fields in answer ({answer_chars} chars): \"{preview}\"")]
    NoRecognizedFields {
        /// Length of the raw answer
        answer_chars: usize,
        /// Start of the raw answer, whitespace collapsed
        preview: String,
    },
}

/// Errors that can occur during extraction
///
/// Each failure kind keeps its own variant so callers can tell a backend
/// outage from an unusable answer or a bad article reference.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Article content could not be acquired
    #[error("Content fetch error: {0}")]
    ContentFetch(#[from] ContentFetchError),

    /// Backend call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Backend answer held no recognized fields
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Request rejected before any backend call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Blocking extraction task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ExtractorError {
    fn from(e: tokio::task::JoinError) -> Self {
        ExtractorError::Task(e.to_string())
    }
}
