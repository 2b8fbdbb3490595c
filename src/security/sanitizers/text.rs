//! Free-text sanitizers: text, name, code, description, status, generic

use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::FieldValue;

/// NFC-normalize and drop control characters. Newlines and tabs survive
/// only when `keep_layout` is set; `\r\n` is folded to `\n`.
pub fn normalize(input: &str, keep_layout: bool) -> String {
    // Composition runs last so that removed characters cannot leave a
    // decomposed sequence behind
    input
        .replace("\r\n", "\n")
        .chars()
        .filter_map(|c| match c {
            '\n' | '\t' if keep_layout => Some(c),
            '\n' | '\t' | '\r' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .nfc()
        .collect()
}

/// Hard-truncate to at most `max` characters
pub fn truncate_chars(value: String, max: Option<usize>) -> String {
    match max {
        Some(max) if value.chars().count() > max => value.chars().take(max).collect(),
        _ => value,
    }
}

fn strip_markup(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(value: String) -> Result<FieldValue, SanitizeError> {
    if value.is_empty() {
        Err(SanitizeError::Rejected {
            reason: "nothing left after removing disallowed characters",
        })
    } else {
        Ok(FieldValue::Text(value))
    }
}

pub fn sanitize_text(value: &str, rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let cleaned = normalize(&strip_markup(value), false);
    let cleaned = truncate_chars(cleaned.trim().to_string(), rule.max_length);
    non_empty(cleaned.trim_end().to_string())
}

pub fn sanitize_description(
    value: &str,
    rule: &ValidationRule,
) -> Result<FieldValue, SanitizeError> {
    let cleaned = normalize(&strip_markup(value), true);
    let cleaned = truncate_chars(cleaned.trim().to_string(), rule.max_length);
    non_empty(cleaned.trim_end().to_string())
}

/// Letters, marks, spaces and `' - . ,` only; whitespace runs collapse
pub fn sanitize_name(value: &str, rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let kept: String = normalize(value, false)
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '\'' | '-' | '.' | ','))
        .nfc()
        .collect();
    let collapsed = collapse_whitespace(&kept);
    non_empty(truncate_chars(collapsed, rule.max_length).trim_end().to_string())
}

/// Upper-cased `[A-Z0-9_.-]`
pub fn sanitize_code(value: &str, rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let kept: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect::<String>()
        .to_ascii_uppercase();
    non_empty(truncate_chars(kept, rule.max_length))
}

/// Upper-cased `[A-Z_]`
pub fn sanitize_status(value: &str, rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let kept: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '_')
        .collect::<String>()
        .to_ascii_uppercase();
    non_empty(truncate_chars(kept, rule.max_length))
}

/// Fallback for values whose type is not known: normalize, strip control
/// characters and HTML-escape. The escaped form, not the input, is what must
/// fit in the rule's `max_length`, so escaping stops at the last whole
/// character or entity that fits.
pub fn sanitize_generic(value: &str, rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let cleaned = normalize(value, true);
    let escaped = escape_within(cleaned.trim(), rule.max_length);
    non_empty(escaped.trim_end().to_string())
}

const ENTITIES: [(&str, char); 6] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#x27;", '\''),
    ("&#39;", '\''),
];

fn entity_at(input: &str) -> Option<(&'static str, char)> {
    ENTITIES
        .iter()
        .copied()
        .find(|(entity, _)| input.starts_with(entity))
}

/// Escape `& < > " '` for HTML contexts. Already-escaped entities are left
/// alone, so escaping twice gives the same result as escaping once.
pub fn escape_html(input: &str) -> String {
    escape_within(input, None)
}

fn escape_within(input: &str, max_chars: Option<usize>) -> String {
    let mut escaped = String::with_capacity(input.len());
    let mut width = 0;
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        let (piece, consumed) = match c {
            '&' => match entity_at(rest) {
                // Existing entities are kept whole, never split by the limit
                Some((entity, _)) => (entity, entity.len()),
                None => ("&amp;", 1),
            },
            '<' => ("&lt;", 1),
            '>' => ("&gt;", 1),
            '"' => ("&quot;", 1),
            '\'' => ("&#x27;", 1),
            c => (&rest[..c.len_utf8()], c.len_utf8()),
        };

        let piece_width = piece.chars().count();
        if max_chars.is_some_and(|max| width + piece_width > max) {
            break;
        }
        escaped.push_str(piece);
        width += piece_width;
        rest = &rest[consumed..];
    }

    escaped
}

/// Inverse of [`escape_html`] for the entities it produces. Decodes a single
/// layer, so `&amp;lt;` becomes `&lt;`.
pub fn unescape_html(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut decoded = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        match entity_at(rest) {
            Some((entity, replacement)) => {
                decoded.push(replacement);
                rest = &rest[entity.len()..];
            }
            None => {
                decoded.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    Cow::Owned(decoded)
}
