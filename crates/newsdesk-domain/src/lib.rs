//! Newsdesk Domain Layer
//!
//! Core data model shared by every Newsdesk crate: the article being read, the
//! fixed set of fields we ask a backend to extract, and the raw and normalized
//! forms those fields take. It also defines the collaborator traits the
//! extraction pipeline is written against.
//!
//! ## Key Concepts
//!
//! - **ArticleContent**: plain text plus origin metadata for one article
//! - **Recognized field**: a named attribute from the versioned [`FieldRegistry`]
//! - **FieldMap**: raw field values parsed from one backend answer
//! - **NormalizedRecord**: canonical values (trimmed text, ISO dates or null)
//! - **ProviderKind**: which LLM backend serves a call
//!
//! ## Architecture
//!
//! - No I/O, no global state
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod article;
pub mod error;
pub mod field;
pub mod provider;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use article::{ArticleContent, ContentRef};
pub use error::{ContentFetchError, ProviderError};
pub use field::{FieldKind, FieldRegistry, FieldSpec, FIELD_SET_VERSION};
pub use provider::ProviderKind;
pub use record::{FieldMap, FieldValue, NormalizedRecord};
pub use traits::{ContentSource, ExtractionProvider};
