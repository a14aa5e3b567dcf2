//! Extraction pipeline: article text to normalized record

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::normalizer::FieldNormalizer;
use crate::parser::ResponseParser;
use crate::prompt::PromptBuilder;
use crate::types::{ArticleReport, ExtractionMetadata, ExtractionOutcome};
use chrono::NaiveDate;
use newsdesk_domain::{
    ArticleContent, ContentRef, ContentSource, FieldRegistry, FieldSpec, NormalizedRecord,
    ProviderError, ProviderKind, FIELD_SET_VERSION,
};
use newsdesk_llm::ProviderRegistry;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Runs prompt construction, the backend call, parsing and normalization
///
/// Holds no per-run state, so one pipeline can be shared across threads or
/// tasks. Every run makes exactly one backend call and nothing is retried
/// here; retries belong to the providers.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    providers: ProviderRegistry,
    registry: FieldRegistry,
    config: ExtractorConfig,
}

impl ExtractionPipeline {
    /// Create a pipeline over `providers`
    ///
    /// The recognized field set is the built-in news set plus the config's
    /// extra fields.
    pub fn new(providers: ProviderRegistry, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            registry: config.field_registry(),
            providers,
            config,
        })
    }

    /// The recognized field set
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// The pipeline configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The configured backends
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Extract `field_list` from `article_text` using the `provider` backend
    ///
    /// # Errors
    /// - [`ExtractorError::InvalidRequest`] for empty text, an empty field
    ///   list or an unrecognized field name
    /// - [`ExtractorError::Provider`] when the backend call fails
    /// - [`ExtractorError::Parse`] when the answer holds no requested field
    pub fn run<S: AsRef<str>>(
        &self,
        article_text: &str,
        field_list: &[S],
        provider: ProviderKind,
    ) -> Result<NormalizedRecord, ExtractorError> {
        self.run_content(&ArticleContent::new(article_text), field_list, provider)
            .map(|outcome| outcome.record)
    }

    /// Like [`run`](Self::run), for already acquired content, also returning
    /// run metadata
    pub fn run_content<S: AsRef<str>>(
        &self,
        content: &ArticleContent,
        field_list: &[S],
        provider: ProviderKind,
    ) -> Result<ExtractionOutcome, ExtractorError> {
        let fields = self.validate_request(&content.text, field_list)?;
        let backend = self.providers.get(provider)?;

        let run_id = Uuid::now_v7();
        let span = info_span!("extraction", %run_id, provider = %provider);
        let _enter = span.enter();
        let start_time = Instant::now();

        info!(
            "Starting extraction of {} fields from {} chars with model '{}'",
            fields.len(),
            content.text.chars().count(),
            backend.model()
        );

        // 1. Build the request
        let prompt = PromptBuilder::new(&content.text, &fields)
            .with_title(content.title.as_deref())
            .build();
        debug!("Prompt length: {} chars", prompt.len());

        // 2. Call the backend
        let answer = backend.extract(&prompt).inspect_err(|e| {
            warn!("Provider call failed: {}", e);
        })?;
        debug!("Answer length: {} chars", answer.len());

        // 3. Parse
        let parsed = ResponseParser::new(&fields)
            .with_threshold(self.config.fuzzy_match_threshold)
            .parse(&answer)
            .inspect_err(|e| {
                warn!("Answer could not be parsed: {}", e);
            })?;
        info!("Parsed {} of {} requested fields", parsed.len(), fields.len());

        // 4. Normalize
        let record = FieldNormalizer::new(&self.registry).normalize(&parsed);

        let names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
        let missing = record.missing_fields(&names);
        if !missing.is_empty() {
            warn!("Backend did not supply: {}", missing.join(", "));
        }

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!("Extraction complete in {} ms", processing_time_ms);

        Ok(ExtractionOutcome {
            record,
            metadata: ExtractionMetadata {
                run_id: run_id.to_string(),
                provider,
                model_name: backend.model().to_string(),
                field_set_version: FIELD_SET_VERSION,
                fields_requested: names,
                fields_missing: missing,
                processing_time_ms,
            },
        })
    }

    /// Run on tokio's blocking pool, bounded by the configured timeout
    ///
    /// # Errors
    /// As [`run`](Self::run); an expired timeout yields
    /// `ExtractorError::Provider(ProviderError::Timeout)`.
    pub async fn run_async(
        &self,
        article_text: String,
        field_list: Vec<String>,
        provider: ProviderKind,
    ) -> Result<NormalizedRecord, ExtractorError> {
        let pipeline = self.clone();
        let task = tokio::task::spawn_blocking(move || pipeline.run(&article_text, &field_list, provider));

        timeout(self.config.extraction_timeout(), task)
            .await
            .map_err(|_| {
                warn!(
                    "Extraction exceeded {} s timeout",
                    self.config.extraction_timeout_secs
                );
                ExtractorError::Provider(ProviderError::Timeout)
            })??
    }

    /// Acquire an article through `source` and extract its fields
    ///
    /// `received_on` is the date the article arrived; it only feeds the
    /// report's received month.
    pub fn extract_article<S: AsRef<str>>(
        &self,
        source: &dyn ContentSource,
        reference: &ContentRef,
        field_list: &[S],
        provider: ProviderKind,
        received_on: Option<NaiveDate>,
    ) -> Result<ArticleReport, ExtractorError> {
        // Reject bad field lists before touching the network
        self.validate_fields(field_list)?;

        info!("Fetching content for {}", reference);
        let content = source.fetch(reference)?;
        let outcome = self.run_content(&content, field_list, provider)?;

        let article_url = match reference {
            ContentRef::Url(url) => Some(url.clone()),
            ContentRef::Document { .. } => None,
        };

        Ok(ArticleReport {
            article_received_month: received_on.map(|d| d.format("%B %Y").to_string()),
            article_url,
            page_source: content.source_url,
            page_title: content.title,
            page_content: content.text,
            features: outcome.record,
            metadata: outcome.metadata,
        })
    }

    fn validate_request<S: AsRef<str>>(
        &self,
        article_text: &str,
        field_list: &[S],
    ) -> Result<Vec<FieldSpec>, ExtractorError> {
        if article_text.trim().is_empty() {
            return Err(ExtractorError::InvalidRequest("article text is empty".to_string()));
        }
        self.validate_fields(field_list)
    }

    fn validate_fields<S: AsRef<str>>(&self, field_list: &[S]) -> Result<Vec<FieldSpec>, ExtractorError> {
        if field_list.is_empty() {
            return Err(ExtractorError::InvalidRequest("no fields requested".to_string()));
        }
        self.registry.select(field_list).map_err(|unknown| {
            ExtractorError::InvalidRequest(format!(
                "'{}' is not a recognized field (known: {})",
                unknown,
                self.registry.names().join(", ")
            ))
        })
    }
}
