//! Article content and references to where it comes from

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an article a content source can acquire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentRef {
    /// Web page to fetch
    Url(String),

    /// Uploaded document whose text has already been extracted
    Document {
        /// Original file name, if known
        name: Option<String>,
        /// Plain text of the document
        text: String,
    },
}

impl ContentRef {
    /// Reference a web page
    pub fn url(url: impl Into<String>) -> Self {
        ContentRef::Url(url.into())
    }

    /// Reference an uploaded document's text
    pub fn document(name: Option<String>, text: impl Into<String>) -> Self {
        ContentRef::Document {
            name,
            text: text.into(),
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRef::Url(url) => write!(f, "{}", url),
            ContentRef::Document { name: Some(name), .. } => write!(f, "document:{}", name),
            ContentRef::Document { name: None, .. } => write!(f, "document"),
        }
    }
}

/// Plain text of one article plus origin metadata
///
/// Produced once per acquisition and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    /// Extracted plain text (non-empty)
    pub text: String,

    /// Where the text came from (final URL after redirects, or file name)
    pub source_url: Option<String>,

    /// Page or document title
    pub title: Option<String>,
}

impl ArticleContent {
    /// Create content with no metadata
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_url: None,
            title: None,
        }
    }

    /// Attach the origin
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_url = Some(source.into());
        self
    }

    /// Attach the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_builder() {
        let content = ArticleContent::new("body")
            .with_source("https://example.com/a")
            .with_title("A");
        assert_eq!(content.text, "body");
        assert_eq!(content.source_url.as_deref(), Some("https://example.com/a"));
        assert_eq!(content.title.as_deref(), Some("A"));
    }

    #[test]
    fn test_content_ref_display() {
        assert_eq!(ContentRef::url("https://x.io").to_string(), "https://x.io");
        assert_eq!(
            ContentRef::document(Some("brief.txt".into()), "t").to_string(),
            "document:brief.txt"
        );
        assert_eq!(ContentRef::document(None, "t").to_string(), "document");
    }
}
