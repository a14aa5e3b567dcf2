//! Configuration for the extraction pipeline

use crate::parser::DEFAULT_MATCH_THRESHOLD;
use newsdesk_domain::{FieldRegistry, FieldSpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum time for one extraction through `run_async` (seconds)
    pub extraction_timeout_secs: u64,

    /// Minimum similarity (0.0 - 1.0) for a fuzzy answer key match
    pub fuzzy_match_threshold: f64,

    /// Fields requested when a caller does not name any
    pub default_fields: Vec<String>,

    /// Fields registered on top of the built-in news set
    pub extra_fields: Vec<FieldSpec>,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Built-in news fields plus `extra_fields`
    pub fn field_registry(&self) -> FieldRegistry {
        let mut registry = FieldRegistry::news();
        for field in &self.extra_fields {
            registry.register(field.clone());
        }
        registry
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if !(self.fuzzy_match_threshold > 0.0 && self.fuzzy_match_threshold <= 1.0) {
            return Err(format!(
                "fuzzy_match_threshold {} out of range (0.0, 1.0]",
                self.fuzzy_match_threshold
            ));
        }
        for field in &self.extra_fields {
            let valid = !field.name.is_empty()
                && field
                    .name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if !valid {
                return Err(format!("extra field name '{}' must be lowercase snake_case", field.name));
            }
        }
        if self.default_fields.is_empty() {
            return Err("default_fields must name at least one field".to_string());
        }
        let registry = self.field_registry();
        if let Err(unknown) = registry.select(&self.default_fields) {
            return Err(format!("default field '{}' is not a recognized field", unknown));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            extraction_timeout_secs: 120,
            fuzzy_match_threshold: DEFAULT_MATCH_THRESHOLD,
            default_fields: ["headline", "article_date", "date", "summary", "entities"]
                .into_iter()
                .map(String::from)
                .collect(),
            extra_fields: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter timeout, strict key matching
    pub fn aggressive() -> Self {
        Self {
            extraction_timeout_secs: 60,
            fuzzy_match_threshold: 0.92,
            ..Self::default()
        }
    }

    /// Lenient preset: longer timeout, looser key matching
    pub fn lenient() -> Self {
        Self {
            extraction_timeout_secs: 300,
            fuzzy_match_threshold: 0.75,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
