//! Newsdesk Content Sources
//!
//! `ContentSource` implementations that turn a [`ContentRef`] into plain
//! [`ArticleContent`]. They sit outside the extraction core: the pipeline only
//! ever sees the resulting text.
//!
//! # Sources
//!
//! - `WebPageSource`: fetches a URL and reduces the HTML to article text
//! - `DocumentSource`: wraps text already extracted from an uploaded document
//! - `ContentFetcher`: dispatches to one of the above by reference type
//!
//! # Examples
//!
//! ```
//! use newsdesk_content::DocumentSource;
//! use newsdesk_domain::{ContentRef, ContentSource};
//!
//! let source = DocumentSource::new();
//! let content = source
//!     .fetch(&ContentRef::document(Some("brief.txt".into()), "Acme Corp announces Q3 results."))
//!     .unwrap();
//! assert_eq!(content.source_url.as_deref(), Some("brief.txt"));
//! ```

#![warn(missing_docs)]

pub mod html;

use newsdesk_domain::{ArticleContent, ContentFetchError, ContentRef, ContentSource};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Settings for fetching article pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// HTTP timeout (seconds)
    pub timeout_secs: u64,

    /// User-Agent header sent with page requests
    pub user_agent: String,

    /// Pages whose extracted text is shorter than this are treated as empty
    pub min_text_chars: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("newsdesk/", env!("CARGO_PKG_VERSION")).to_string(),
            min_text_chars: 1,
        }
    }
}

/// Fetches article pages over HTTP
pub struct WebPageSource {
    client: Client,
    min_text_chars: usize,
}

impl WebPageSource {
    /// Create a source with the given settings
    pub fn new(config: &ContentConfig) -> Result<Self, ContentFetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ContentFetchError::InvalidReference(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            min_text_chars: config.min_text_chars.max(1),
        })
    }

    fn fetch_url(&self, raw_url: &str) -> Result<ArticleContent, ContentFetchError> {
        let url = parse_url(raw_url)?;
        info!("Fetching article {}", url);

        let response = self.client.get(url.clone()).send().map_err(|e| {
            if e.is_timeout() {
                ContentFetchError::Timeout(url.to_string())
            } else {
                ContentFetchError::Unreachable(format!("{}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentFetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .map_err(|e| ContentFetchError::Decode(format!("{}: {}", final_url, e)))?;
        debug!("Fetched {} bytes from {}", body.len(), final_url);

        let page = html::page_text(&body);
        if page.text.chars().count() < self.min_text_chars {
            return Err(ContentFetchError::EmptyContent(final_url));
        }

        let mut content = ArticleContent::new(page.text).with_source(final_url);
        content.title = page.title;
        Ok(content)
    }
}

impl ContentSource for WebPageSource {
    fn fetch(&self, reference: &ContentRef) -> Result<ArticleContent, ContentFetchError> {
        match reference {
            ContentRef::Url(url) => self.fetch_url(url),
            ContentRef::Document { .. } => Err(ContentFetchError::InvalidReference(
                "web page source cannot read uploaded documents".to_string(),
            )),
        }
    }
}

/// Wraps text already extracted from an uploaded document
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentSource;

impl DocumentSource {
    /// Create a document source
    pub fn new() -> Self {
        Self
    }
}

impl ContentSource for DocumentSource {
    fn fetch(&self, reference: &ContentRef) -> Result<ArticleContent, ContentFetchError> {
        match reference {
            ContentRef::Document { name, text } => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(ContentFetchError::EmptyContent(reference.to_string()));
                }
                let mut content = ArticleContent::new(text);
                content.source_url = name.clone();
                Ok(content)
            }
            ContentRef::Url(url) => Err(ContentFetchError::InvalidReference(format!(
                "document source cannot fetch {}",
                url
            ))),
        }
    }
}

/// Dispatches each reference to the source that can read it
pub struct ContentFetcher {
    web: WebPageSource,
    documents: DocumentSource,
}

impl ContentFetcher {
    /// Create a fetcher with the given page settings
    pub fn new(config: &ContentConfig) -> Result<Self, ContentFetchError> {
        Ok(Self {
            web: WebPageSource::new(config)?,
            documents: DocumentSource::new(),
        })
    }
}

impl ContentSource for ContentFetcher {
    fn fetch(&self, reference: &ContentRef) -> Result<ArticleContent, ContentFetchError> {
        match reference {
            ContentRef::Url(_) => self.web.fetch(reference),
            ContentRef::Document { .. } => self.documents.fetch(reference),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, ContentFetchError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ContentFetchError::InvalidReference(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ContentFetchError::InvalidReference(format!(
            "unsupported scheme '{}' in {}",
            other, raw
        ))),
    }
}
