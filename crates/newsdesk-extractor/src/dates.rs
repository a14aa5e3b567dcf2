//! Date standardization for date-typed fields
//!
//! Backends return dates in whatever shape the article used. Parsing follows a
//! fixed priority list and the first format that parses wins. Numeric dates are
//! read day-first, so `01/02/2024` is 1 February 2024; month-first is only
//! tried when day-first is impossible (`03/15/2024`).

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Accepted formats, in priority order
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%d %b, %Y",
    "%d/%m/%y",
    "%m/%d/%y",
];

/// Years outside this range are treated as misparses
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

const MONTH: &str = r"\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*";

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:first\s+)?(?:published|updated|posted|dated|date|released|on|as\s+of)\b[:\s]*)+")
        .expect("valid regex")
});

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues?|wed|thu(?:rs?)?|fri|sat|sun)\b\.?,?",
    )
    .expect("valid regex")
});

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid regex"));

static FILLER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bthe\b|\bof\b").expect("valid regex"));

static SEPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsept\b").expect("valid regex"));

static ABBREV_DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Za-z]{3,})\.").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static EMBEDDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\d{{4}}-\d{{1,2}}-\d{{1,2}}|\d{{4}}[/.]\d{{1,2}}[/.]\d{{1,2}}|\d{{1,2}}[/.-]\d{{1,2}}[/.-]\d{{2,4}}|{m}\s+\d{{1,2}},?\s+\d{{4}}|\d{{1,2}}\s+{m},?\s+\d{{4}}",
        m = MONTH
    ))
    .expect("valid regex")
});

/// Parse a raw date string into a calendar date
///
/// Tries, in order: an ISO/RFC 3339 timestamp, the exact [`DATE_FORMATS`],
/// the same formats after stripping labels, weekdays and ordinals, and
/// finally the first date-shaped substring. Returns `None` when nothing
/// parses.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = strip_wrapping(raw);
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = parse_timestamp(trimmed).or_else(|| parse_exact(trimmed)) {
        return Some(date);
    }

    let phrase = simplify_phrase(trimmed);
    if let Some(date) = parse_exact(&phrase) {
        return Some(date);
    }

    EMBEDDED
        .find_iter(&phrase)
        .find_map(|m| parse_exact(m.as_str()))
}

/// Try every accepted format against the whole string
fn parse_exact(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(|d| YEAR_RANGE.contains(&d.year()))
}

fn parse_timestamp(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .filter(|d| YEAR_RANGE.contains(&d.year()))
}

fn strip_wrapping(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .trim_end_matches(['.', ',', ';'])
        .trim()
}

/// Reduce a natural-language phrase to something the formats can read
fn simplify_phrase(s: &str) -> String {
    let s = LABEL.replace(s, "");
    let s = WEEKDAY.replace_all(&s, " ");
    let s = ORDINAL.replace_all(&s, "$1");
    let s = FILLER.replace_all(&s, " ");
    let s = SEPT.replace_all(&s, "Sep");
    let s = ABBREV_DOT.replace_all(&s, "$1");
    let s = WHITESPACE.replace_all(&s, " ");
    let s = s.replace(" ,", ",");
    s.trim().trim_start_matches(',').trim().trim_end_matches(['.', ',']).to_string()
}
