//! Canonicalize raw field values

use crate::dates::parse_date;
use newsdesk_domain::{FieldMap, FieldRegistry, FieldValue, NormalizedRecord};
use tracing::warn;

/// Converts a [`FieldMap`] into a [`NormalizedRecord`]
///
/// Date-typed fields become calendar dates (or explicit nulls). Everything
/// else is treated as text. Normalization never fails.
pub struct FieldNormalizer<'a> {
    registry: &'a FieldRegistry,
}

impl<'a> FieldNormalizer<'a> {
    /// Create a normalizer using the field kinds from `registry`
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    /// Normalize every field present in `fields`
    pub fn normalize(&self, fields: &FieldMap) -> NormalizedRecord {
        let mut record = NormalizedRecord::new();
        for (name, raw) in fields.iter() {
            let value = if self.registry.is_date(name) {
                let date = parse_date(raw);
                if date.is_none() && !raw.trim().is_empty() {
                    warn!("Unparseable date for '{}': {:?}", name, raw);
                }
                FieldValue::Date(date)
            } else {
                FieldValue::Text(clean_text(raw))
            };
            record.insert(name, value);
        }
        record
    }
}

/// Trim and unwrap hard line breaks
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
