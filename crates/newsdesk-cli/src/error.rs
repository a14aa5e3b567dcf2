//! Error types for the CLI application.

use newsdesk_domain::ContentFetchError;
use newsdesk_extractor::ExtractorError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction pipeline error
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// Content source could not be set up
    #[error("Content error: {0}")]
    Content(#[from] ContentFetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some articles could not be processed
    #[error("{failed} of {total} article(s) failed")]
    ExtractionFailed {
        /// Articles that failed
        failed: usize,
        /// Articles attempted
        total: usize,
    },
}
