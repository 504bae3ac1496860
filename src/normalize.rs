//! Locale-tolerant number parsing for upstream cells
//!
//! volby.cz renders numbers with non-breaking spaces as digit group
//! separators and a decimal comma (`1 234 567`, `12,5 %`). Both functions
//! here are total: anything that does not look like a number becomes `None`.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn percent_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").expect("valid percent pattern"))
}

/// Parse an integer from decorated text, keeping only digits and `-`.
///
/// Empty input and the `-` placeholder yield `None`.
pub fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return None;
    }
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse the first signed decimal number in `text`; comma or dot as separator.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let text = text.replace(',', ".");
    percent_pattern()
        .find(&text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Integer view of a JSON value: numbers pass through, strings are parsed.
///
/// Non-integral floats are rounded to the nearest integer.
pub fn normalize_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Float view of a JSON value: numbers pass through, strings are parsed.
pub fn normalize_percentage(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_percentage(s),
        _ => None,
    }
}
