//! Reading data literals embedded in chart scripts
//!
//! The d3 chart pages carry their data as `let data = [...]` or
//! `let data = {...}` JavaScript literals with bareword keys and
//! single-quoted strings.

use serde_json::Value;

/// Failure to locate or balance a literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("could not locate marker {0:?}")]
    MarkerMissing(String),
    #[error("could not locate {opening:?} after marker {marker:?}")]
    OpeningMissing { marker: String, opening: char },
    #[error("unbalanced brackets while reading literal")]
    Unbalanced,
}

/// Cut the balanced `[...]` or `{...}` literal that follows `marker`.
///
/// Brackets inside string literals are ignored; a backslash escapes the
/// next character.
pub fn extract_js_literal<'s>(
    script: &'s str,
    marker: &str,
    opening: char,
) -> Result<&'s str, LiteralError> {
    let marker_at = script
        .find(marker)
        .ok_or_else(|| LiteralError::MarkerMissing(marker.to_string()))?;
    let start = script[marker_at..]
        .find(opening)
        .map(|offset| marker_at + offset)
        .ok_or_else(|| LiteralError::OpeningMissing {
            marker: marker.to_string(),
            opening,
        })?;
    let closing = if opening == '[' { ']' } else { '}' };

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in script[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == opening => depth += 1,
            None if c == closing => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Ok(&script[start..end]);
                }
            }
            None => {}
        }
    }
    Err(LiteralError::Unbalanced)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Rewrite a JavaScript object/array literal as JSON text.
///
/// Quotes bareword keys, converts single-quoted strings, and drops
/// trailing commas. String contents are never touched.
pub fn js_object_to_json(literal: &str) -> String {
    let chars: Vec<char> = literal.chars().collect();
    let mut out = String::with_capacity(literal.len() + 16);
    let mut i = 0;

    let next_significant = |from: usize| chars[from..].iter().copied().find(|c| !c.is_whitespace());

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            out.push('"');
            i += 1;
            while i < chars.len() && chars[i] != c {
                match chars[i] {
                    '\\' if i + 1 < chars.len() => {
                        // JSON has no \' escape
                        if chars[i + 1] == '\'' {
                            out.push('\'');
                        } else {
                            out.push('\\');
                            out.push(chars[i + 1]);
                        }
                        i += 2;
                        continue;
                    }
                    '"' => out.push_str("\\\""),
                    other => out.push(other),
                }
                i += 1;
            }
            out.push('"');
            i += 1;
        } else if is_ident_char(c) {
            let begin = i;
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            let word: String = chars[begin..i].iter().collect();
            if next_significant(i) == Some(':') {
                out.push('"');
                out.push_str(&word);
                out.push('"');
            } else {
                out.push_str(&word);
            }
        } else if c == ',' && matches!(next_significant(i + 1), Some(']') | Some('}')) {
            i += 1;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Locate, convert and parse the literal after `marker`
pub fn parse_js_literal(script: &str, marker: &str, opening: char) -> Option<Value> {
    let literal = extract_js_literal(script, marker, opening).ok()?;
    serde_json::from_str(&js_object_to_json(literal)).ok()
}
