//! Newsdesk Extractor
//!
//! Turns news article text into a normalized record of requested fields
//! using an LLM backend.
//!
//! # Architecture
//!
//! ```text
//! ContentSource → text → PromptBuilder → ExtractionProvider → ResponseParser → FieldNormalizer → NormalizedRecord
//! ```
//!
//! # Key Features
//!
//! - **Interchangeable backends**: OpenAI, Gemini and Ollama behind one trait,
//!   selected per call by `ProviderKind`
//! - **Tolerant parsing**: JSON, fenced JSON or `key: value` lines, fuzzy key
//!   matching, last occurrence wins
//! - **Date standardization**: a fixed, day-first list of formats; anything
//!   else becomes an explicit null
//!
//! # Example Usage
//!
//! ```
//! use newsdesk_domain::ProviderKind;
//! use newsdesk_extractor::{ExtractionPipeline, ExtractorConfig};
//! use newsdesk_llm::{MockProvider, ProviderRegistry};
//!
//! let provider = MockProvider::new(r#"{"article_date": "15/03/2024", "summary": "Acme results."}"#);
//! let providers = ProviderRegistry::new().with_provider(provider);
//! let pipeline = ExtractionPipeline::new(providers, ExtractorConfig::default()).unwrap();
//!
//! let record = pipeline
//!     .run("Acme Corp announces Q3 results.", &["article_date", "summary"], ProviderKind::OpenAi)
//!     .unwrap();
//!
//! assert_eq!(record.date("article_date").unwrap().to_string(), "2024-03-15");
//! assert_eq!(record.text("summary"), Some("Acme results."));
//! ```

#![warn(missing_docs)]

mod config;
mod dates;
mod error;
mod normalizer;
mod parser;
mod pipeline;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use dates::{parse_date, DATE_FORMATS};
pub use error::{ExtractorError, ParseError};
pub use normalizer::{clean_text, FieldNormalizer};
pub use parser::{canonical_key, ResponseParser, DEFAULT_MATCH_THRESHOLD};
pub use pipeline::ExtractionPipeline;
pub use prompt::PromptBuilder;
pub use types::{ArticleReport, ExtractionMetadata, ExtractionOutcome};
