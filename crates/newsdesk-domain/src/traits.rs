//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction core and the
//! infrastructure it talks to. Implementations live in other crates.

use crate::{ArticleContent, ContentFetchError, ContentRef, ProviderError, ProviderKind};

/// An LLM backend able to answer an extraction request
///
/// Implemented by the infrastructure layer (newsdesk-llm). One call issues at
/// most one logical request to the backend; any retrying is the
/// implementation's own business and must still end in a `ProviderError`
/// rather than blocking indefinitely.
pub trait ExtractionProvider: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> ProviderKind;

    /// Model identifier, for logs and reports
    fn model(&self) -> &str;

    /// Send the extraction request and return the backend's raw answer
    ///
    /// # Errors
    /// Unreachable backend, rejected request, timeout, input over the
    /// backend's limit, or an empty answer.
    fn extract(&self, request: &str) -> Result<String, ProviderError>;
}

/// Acquires plain article text from a reference
///
/// Implemented by the infrastructure layer (newsdesk-content)
pub trait ContentSource: Send + Sync {
    /// Fetch the article behind `reference`
    ///
    /// # Errors
    /// Failures are reported, never masked: unreachable origin, bad status,
    /// undecodable or empty documents.
    fn fetch(&self, reference: &ContentRef) -> Result<ArticleContent, ContentFetchError>;
}
