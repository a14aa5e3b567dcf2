//! Parse backend answers into raw field values
//!
//! Answers are treated as a sequence of segments split on markdown code
//! fences. Each segment is read as a JSON object when it holds one, and as
//! `key: value` lines otherwise. Objects that are not valid JSON (single
//! quotes, trailing commas) are split into `key: value` fragments. Keys are matched against the requested
//! fields by name, alias and, failing that, string similarity. Later
//! segments and later lines override earlier ones.

use crate::error::ParseError;
use newsdesk_domain::{FieldMap, FieldSpec};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Minimum normalized similarity for a fuzzy key match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

static KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:[-*•+]\s+|\d+[.)]\s+)?[*_"'`]*\s*(?P<key>[A-Za-z][A-Za-z0-9 _\-./()]{0,48}?)\s*[*_"'`]*\s*[:=]\s*(?P<value>.*)$"#,
    )
    .expect("valid regex")
});

/// A key at the start of the text following a comma
static NEXT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*["']?[A-Za-z][A-Za-z0-9 _\-]{0,48}["']?\s*[:=]"#).expect("valid regex")
});

static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+\-]+$").expect("valid regex"));

/// Turns raw answers into a [`FieldMap`] keyed by canonical field names
#[derive(Debug, Clone)]
pub struct ResponseParser<'a> {
    fields: &'a [FieldSpec],
    threshold: f64,
}

impl<'a> ResponseParser<'a> {
    /// Create a parser that recognizes the given fields
    pub fn new(fields: &'a [FieldSpec]) -> Self {
        Self {
            fields,
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    /// Override the fuzzy key match threshold (0.0 - 1.0)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Parse a raw answer
    ///
    /// # Errors
    /// Returns [`ParseError::NoRecognizedFields`] when not a single requested
    /// field could be read from the answer.
    pub fn parse(&self, raw_answer: &str) -> Result<FieldMap, ParseError> {
        let mut fields = FieldMap::new();
        for segment in split_segments(raw_answer) {
            fields.merge(self.parse_segment(segment));
        }

        if fields.is_empty() {
            return Err(ParseError::NoRecognizedFields {
                answer_chars: raw_answer.chars().count(),
                preview: preview(raw_answer),
            });
        }
        Ok(fields)
    }

    fn parse_segment(&self, segment: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        if let Some((before, json, after)) = split_json_object(segment) {
            match serde_json::from_str::<Value>(json) {
                Ok(Value::Object(object)) => {
                    self.collect_object(&object, &mut fields);
                    return fields;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Answer segment is not valid JSON, reading it leniently: {}", e);
                    let mut lines = vec![before.to_string()];
                    lines.extend(object_fragments(&json[1..json.len() - 1]));
                    lines.push(after.to_string());
                    self.collect_lines(&lines.join("\n"), &mut fields);
                    return fields;
                }
            }
        }
        self.collect_lines(segment, &mut fields);
        fields
    }

    fn collect_object(&self, object: &Map<String, Value>, fields: &mut FieldMap) {
        for (key, value) in object {
            match self.match_key(key) {
                Some(spec) => {
                    if let Some(text) = json_to_text(value) {
                        fields.insert(spec.name.clone(), text);
                    }
                }
                // Wrapper objects such as {"features": {...}}
                None => match value {
                    Value::Object(inner) => self.collect_object(inner, fields),
                    _ => debug!("Dropping unrecognized key '{}'", key),
                },
            }
        }
    }

    fn collect_lines(&self, segment: &str, fields: &mut FieldMap) {
        let mut current: Option<(String, String)> = None;

        for line in segment.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || is_structural(trimmed) {
                flush(&mut current, fields);
                continue;
            }

            if let Some(caps) = KEY_LINE.captures(line) {
                let key = &caps["key"];
                if let Some(spec) = self.match_key(key) {
                    flush(&mut current, fields);
                    current = Some((spec.name.clone(), clean_value(&caps["value"])));
                    continue;
                }
                if current.is_none() {
                    debug!("Dropping unrecognized key '{}'", key.trim());
                    continue;
                }
            }

            if let Some((_, value)) = current.as_mut() {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(&clean_value(trimmed));
            }
        }
        flush(&mut current, fields);
    }

    /// Resolve an answer key to one of the requested fields
    fn match_key(&self, raw_key: &str) -> Option<&'a FieldSpec> {
        let key = canonical_key(raw_key);
        if key.is_empty() {
            return None;
        }

        let fields = self.fields;
        if let Some(spec) = fields.iter().find(|f| f.name == key) {
            return Some(spec);
        }
        if let Some(spec) = fields
            .iter()
            .find(|f| f.aliases.iter().any(|a| canonical_key(a) == key))
        {
            return Some(spec);
        }

        let compact = key.replace('_', "");
        if let Some(spec) = fields
            .iter()
            .find(|f| candidates(f).any(|c| c.replace('_', "") == compact))
        {
            return Some(spec);
        }

        let mut best: Option<(&'a FieldSpec, f64)> = None;
        for spec in fields {
            for candidate in candidates(spec) {
                let score = strsim::normalized_levenshtein(&key, &candidate);
                if score >= self.threshold && best.is_none_or(|(_, s)| score > s) {
                    best = Some((spec, score));
                }
            }
        }
        if let Some((spec, score)) = best {
            debug!("Matched key '{}' to '{}' (similarity {:.2})", raw_key, spec.name, score);
        }
        best.map(|(spec, _)| spec)
    }
}

/// Name and aliases of a field, in canonical key form
fn candidates(spec: &FieldSpec) -> impl Iterator<Item = String> + '_ {
    std::iter::once(spec.name.clone()).chain(spec.aliases.iter().map(|a| canonical_key(a)))
}

/// Lowercase snake_case form of a key: `Article Date`, `articleDate` and
/// `ARTICLE-DATE` all become `article_date`
pub fn canonical_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev: Option<char> = None;
    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase()
                && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
            {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
        prev = Some(c);
    }
    out.trim_end_matches('_').to_string()
}

/// Split an answer on markdown code fences, dropping language tags
fn split_segments(raw: &str) -> Vec<&str> {
    raw.split("```")
        .enumerate()
        .map(|(i, part)| match part.split_once('\n') {
            // Odd parts sit inside a fence
            Some((first, rest)) if i % 2 == 1 && LANGUAGE_TAG.is_match(first.trim()) => rest,
            _ => part,
        })
        .filter(|part| !part.trim().is_empty())
        .collect()
}

/// Split a segment around the span from the first `{` to the last `}`
fn split_json_object(segment: &str) -> Option<(&str, &str, &str)> {
    let start = segment.find('{')?;
    let end = segment.rfind('}')?;
    (start < end).then(|| (&segment[..start], &segment[start..=end], &segment[end + 1..]))
}

/// Split the body of a loosely written object into `key: value` fragments
///
/// Commas inside quotes or nested brackets are kept, and a comma only ends
/// a fragment when a key follows it. Nested objects are flattened.
fn object_fragments(body: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut prev_significant: Option<char> = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match quote {
            Some(q) => {
                if c == q && prev != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                // Only an opening quote after a delimiter; apostrophes in bare words stay literal
                '"' | '\'' if prev_significant.is_none_or(|p| matches!(p, '{' | '[' | ',' | ':' | '=')) => {
                    quote = Some(c)
                }
                '{' | '[' => depth += 1,
                '}' | ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 && NEXT_KEY.is_match(&body[i + 1..]) => {
                    push_fragment(&mut fragments, &body[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
        prev = Some(c);
    }
    push_fragment(&mut fragments, &body[start..]);
    fragments
}

fn push_fragment(fragments: &mut Vec<String>, raw: &str) {
    let fragment = raw.trim();
    match fragment.find('{') {
        Some(open) if fragment.ends_with('}') => {
            fragments.extend(object_fragments(&fragment[open + 1..fragment.len() - 1]))
        }
        _ => fragments.push(fragment.to_string()),
    }
}

fn json_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => obj.get("name").and_then(json_to_text),
                other => json_to_text(other),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Strip list/markdown/JSON punctuation around a line value
fn clean_value(raw: &str) -> String {
    let value = raw.trim().trim_end_matches(',').trim();
    let value = value.trim_matches(|c| c == '*' || c == '`').trim();
    if let Some(items) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        return items
            .split(',')
            .map(|item| unescape(strip_quotes(item.trim())))
            .filter(|item| !item.is_empty() && !item.eq_ignore_ascii_case("null"))
            .collect::<Vec<_>>()
            .join(", ");
    }
    let value = strip_quotes(value);
    if value.eq_ignore_ascii_case("null") {
        String::new()
    } else {
        unescape(value)
    }
}

/// Undo escape sequences left literally in non-JSON answers
fn unescape(value: &str) -> String {
    value
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\t", " ")
        .replace("\\\"", "\"")
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].trim();
        }
    }
    value
}

fn is_structural(line: &str) -> bool {
    matches!(line, "{" | "}" | "}," | "[" | "]" | "],")
}

fn flush(current: &mut Option<(String, String)>, fields: &mut FieldMap) {
    if let Some((name, value)) = current.take() {
        if !value.trim().is_empty() {
            fields.insert(name, value);
        }
    }
}

fn preview(raw: &str) -> String {
    let flat: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 80 {
        format!("{}...", flat.chars().take(80).collect::<String>())
    } else {
        flat
    }
}
