//! Parse helpers for string-encoded cell values
//!
//! These are pure, total functions. None of them panic on any input.

use std::cmp::Ordering;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

static NUMBER_PREFIX: OnceLock<Regex> = OnceLock::new();
static PARTIAL_DATE: OnceLock<Regex> = OnceLock::new();

fn number_prefix() -> &'static Regex {
    NUMBER_PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(Infinity|(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)")
            .unwrap_or_else(|e| panic!("number prefix pattern is invalid: {}", e))
    })
}

/// Empty means missing or zero-length. Whitespace is not empty.
pub fn normalized_empty(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

/// Parses the longest leading numeric prefix, ignoring leading whitespace.
///
/// `"12.5kg"` parses as `12.5`, `"kg"` and `""` parse as NaN.
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let Some(m) = number_prefix().find(trimmed) else {
        return f64::NAN;
    };
    let text = m.as_str();
    match text.trim_start_matches(['+', '-']) {
        "Infinity" if text.starts_with('-') => f64::NEG_INFINITY,
        "Infinity" => f64::INFINITY,
        _ => text.parse::<f64>().unwrap_or(f64::NAN),
    }
}

fn partial_date() -> &'static Regex {
    PARTIAL_DATE.get_or_init(|| {
        Regex::new(r"^(\d{4})(?:-(\d{2}))?$")
            .unwrap_or_else(|e| panic!("partial date pattern is invalid: {}", e))
    })
}

/// Parses a date as milliseconds since the Unix epoch.
///
/// Date strings are tried first (RFC 3339, then zone-less date-times and
/// plain dates, read as UTC). `YYYY` and `YYYY-MM` mean the first day of
/// that year or month. Any other integer falls back to epoch millis.
pub fn parse_date_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    const DATE_TIME_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    if let Some(caps) = partial_date().captures(s) {
        let year = caps[1].parse::<i32>().ok()?;
        let month = caps.get(2).map_or(Some(1), |m| m.as_str().parse::<u32>().ok())?;
        return NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis());
    }

    s.parse::<i64>().ok()
}

/// Splits a multi-value cell into its items.
///
/// A JSON array is read element-wise. Otherwise the text is split on
/// commas, where `\,` escapes a literal comma. Items are trimmed and empty
/// items are dropped.
pub fn parse_multi_string(s: &str) -> Vec<String> {
    let trimmed = s.trim();
    if trimmed.starts_with('[') {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(trimmed) {
            return items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
        }
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Exact, case-sensitive equality. Two missing values are equal.
pub fn string_equal(a: Option<&str>, b: Option<&str>) -> bool {
    a == b
}

/// Case-insensitive substring containment. An empty needle is always found.
pub fn string_includes(haystack: Option<&str>, needle: Option<&str>) -> bool {
    let needle = needle.unwrap_or_default().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystack.unwrap_or_default().to_lowercase().contains(&needle)
}

/// True iff the stored list and the operand list share at least one item.
pub fn list_includes(value: Option<&str>, operand: Option<&str>) -> bool {
    let stored = parse_multi_string(value.unwrap_or_default());
    if stored.is_empty() {
        return false;
    }
    let wanted = parse_multi_string(operand.unwrap_or_default());
    stored.iter().any(|item| wanted.contains(item))
}

/// Final path segment without its extension.
///
/// Wiki-link brackets and alias suffixes (`[[path|alias]]`) are stripped
/// before the segment is taken.
pub fn path_basename(path: &str) -> &str {
    let inner = path
        .trim()
        .trim_start_matches("[[")
        .trim_end_matches("]]");
    let inner = inner.split('|').next().unwrap_or(inner);
    let segment = inner.rsplit('/').next().unwrap_or(inner);
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    }
}

/// Locale-style, numeric-aware string comparison.
///
/// Digit runs compare by numeric value, other runs compare
/// case-insensitively. Remaining ties put lowercase before uppercase.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x, y) {
                    (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digit_runs(x, y),
                    (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
                    (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }

    // Same letters ignoring case: lowercase sorts first.
    a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => x.cmp(&y),
        })
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits {
            Chunk::Digits(chunk)
        } else {
            Chunk::Text(chunk)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_empty() {
        assert!(normalized_empty(None));
        assert!(normalized_empty(Some("")));
        assert!(!normalized_empty(Some(" ")));
        assert!(!normalized_empty(Some("0")));
    }

    #[test]
    fn test_parse_number_prefix() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("  -3.5e2x"), -350.0);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("7."), 7.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("").is_nan());
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("-").is_nan());
    }

    #[test]
    fn test_parse_date_formats() {
        let day = parse_date_millis("2024-03-01").unwrap();
        assert_eq!(day, 1_709_251_200_000);
        assert_eq!(parse_date_millis("2024-03-01T00:00:00Z"), Some(day));
        assert_eq!(parse_date_millis("2024-03-01T00:00"), Some(day));
        assert_eq!(parse_date_millis("1709251200000"), Some(day));
        assert_eq!(parse_date_millis("not a date"), None);
        assert_eq!(parse_date_millis(""), None);
    }

    #[test]
    fn test_parse_partial_dates() {
        assert_eq!(parse_date_millis("2024"), Some(1_704_067_200_000));
        assert_eq!(parse_date_millis("2024-03"), Some(1_709_251_200_000));
        assert_eq!(parse_date_millis("2024-13"), None);
        assert_eq!(parse_date_millis("20240"), Some(20240));
    }

    #[test]
    fn test_parse_multi_string() {
        assert_eq!(parse_multi_string("a, b,,c "), vec!["a", "b", "c"]);
        assert_eq!(parse_multi_string(r"a\,b,c"), vec!["a,b", "c"]);
        assert_eq!(parse_multi_string(r#"["x", "y"]"#), vec!["x", "y"]);
        assert_eq!(parse_multi_string("[[Note]]"), vec!["[[Note]]"]);
        assert!(parse_multi_string("").is_empty());
    }

    #[test]
    fn test_string_equal() {
        assert!(string_equal(Some(""), Some("")));
        assert!(string_equal(None, None));
        assert!(!string_equal(None, Some("a")));
        assert!(!string_equal(Some("A"), Some("a")));
        assert!(!string_equal(Some("a "), Some("a")));
    }

    #[test]
    fn test_string_includes() {
        assert!(string_includes(Some("Hello"), Some("ELL")));
        assert!(string_includes(Some(""), Some("")));
        assert!(string_includes(None, Some("")));
        assert!(!string_includes(Some(""), Some("a")));
    }

    #[test]
    fn test_list_includes() {
        assert!(!list_includes(Some("a,b,c"), Some("d")));
        assert!(list_includes(Some("a,b,c"), Some("b,d")));
        assert!(!list_includes(Some(""), Some("a")));
        assert!(!list_includes(None, Some("a")));
    }

    #[test]
    fn test_path_basename() {
        assert_eq!(path_basename("folder/sub/Note.md"), "Note");
        assert_eq!(path_basename("[[folder/Note|alias]]"), "Note");
        assert_eq!(path_basename("Plain"), "Plain");
        assert_eq!(path_basename(".hidden"), ".hidden");
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("item2", "item10"), Ordering::Less);
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(natural_cmp("a", "A"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
        assert_eq!(natural_cmp("007", "7"), Ordering::Less);
    }
}
