//! Report and metadata types produced by the pipeline

use newsdesk_domain::{NormalizedRecord, ProviderKind};
use serde::Serialize;

/// Normalized record plus what it took to produce it
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    /// Canonical field values
    pub record: NormalizedRecord,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    /// Run identifier (UUIDv7), also recorded on the tracing span
    pub run_id: String,

    /// Backend that answered
    pub provider: ProviderKind,

    /// Model name reported by the backend
    pub model_name: String,

    /// Version of the recognized field set
    pub field_set_version: u32,

    /// Canonical names requested, in request order
    pub fields_requested: Vec<String>,

    /// Requested fields the backend did not supply
    pub fields_missing: Vec<String>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Everything known about one processed article
///
/// Serializes with the same keys the article review screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleReport {
    /// Month the article was received, e.g. "March 2024"
    pub article_received_month: Option<String>,

    /// URL the article was requested from, for URL references
    pub article_url: Option<String>,

    /// Final URL the content came from, after redirects
    pub page_source: Option<String>,

    /// Page or document title
    pub page_title: Option<String>,

    /// Extracted article text
    pub page_content: String,

    /// Normalized fields
    pub features: NormalizedRecord,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}
