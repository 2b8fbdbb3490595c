//! Upload filename sanitizer

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::FieldValue;

const MAX_FILENAME_LENGTH: usize = 255;

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

const DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reduce `value` to a single safe file name.
///
/// Only the last path component is kept, reserved and control characters
/// become `_`, leading dots are removed so the result is never hidden or a
/// relative segment.
pub fn sanitize_filename(value: &str, rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let last_component = value.rsplit(['/', '\\']).next().unwrap_or_default();

    let replaced: String = last_component
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let name = replaced
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    if name.is_empty() {
        return Err(SanitizeError::Rejected {
            reason: "file name is empty",
        });
    }

    let max = rule.max_length.unwrap_or(MAX_FILENAME_LENGTH);
    if name.chars().count() > max {
        return Err(SanitizeError::Rejected {
            reason: "file name is too long",
        });
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension.to_lowercase())),
        None => (name, None),
    };

    if let (Some(extension), Some(forbidden)) = (&extension, &rule.forbidden_extensions) {
        if forbidden.iter().any(|f| f.eq_ignore_ascii_case(extension)) {
            return Err(SanitizeError::Rejected {
                reason: "file type is not allowed",
            });
        }
    }

    let device = stem.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if DEVICE_NAMES.contains(&device.as_str()) {
        return Err(SanitizeError::Rejected {
            reason: "file name is reserved by the operating system",
        });
    }

    Ok(FieldValue::Text(name.to_string()))
}
