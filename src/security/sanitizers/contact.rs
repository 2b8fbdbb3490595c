//! Email, phone and URL sanitizers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::FieldValue;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("Invalid email regex")
});

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Lower-cased, trimmed address
pub fn sanitize_email(value: &str, _rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let email = value.trim().to_lowercase();
    let invalid = SanitizeError::InvalidFormat {
        expected: "an email address",
    };

    if !EMAIL_REGEX.is_match(&email) || email.contains("..") {
        return Err(invalid);
    }

    let (local, domain) = email.split_once('@').ok_or(invalid.clone())?;
    if local.starts_with('.') || local.ends_with('.') || domain.starts_with(['.', '-']) {
        return Err(invalid);
    }

    Ok(FieldValue::Text(email))
}

/// Digits only, keeping a leading `+` for international numbers
pub fn sanitize_phone(value: &str, _rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let trimmed = value.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(SanitizeError::InvalidFormat {
            expected: "a phone number with 7 to 15 digits",
        });
    }

    if trimmed.starts_with('+') {
        Ok(FieldValue::Text(format!("+{}", digits)))
    } else {
        Ok(FieldValue::Text(digits))
    }
}

/// `http`/`https` only; scheme and host are lower-cased, embedded
/// credentials are rejected.
pub fn sanitize_url(value: &str, _rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let url = value.trim();
    let invalid = SanitizeError::InvalidFormat {
        expected: "an http or https URL",
    };

    if url
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | '\'' | '`'))
    {
        return Err(invalid);
    }

    let (scheme, rest) = url.split_once("://").ok_or(invalid.clone())?;
    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(SanitizeError::Rejected {
            reason: "only http and https URLs are accepted",
        });
    }

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);

    if authority.contains('@') {
        return Err(SanitizeError::Rejected {
            reason: "URLs with embedded credentials are not accepted",
        });
    }

    let host = authority.split(':').next().unwrap_or_default();
    if host.is_empty() || host.starts_with(['.', '-']) {
        return Err(invalid);
    }

    Ok(FieldValue::Text(format!(
        "{}://{}{}",
        scheme,
        authority.to_lowercase(),
        tail
    )))
}
