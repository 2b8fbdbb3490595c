//! Password policy
//!
//! Passwords are validated but never transformed: the accepted value is the
//! exact input, untrimmed and unnormalized. Hashing lives in
//! `infrastructure::crypto`.

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::FieldValue;

const DEFAULT_MIN_LENGTH: usize = 8;
const DEFAULT_MAX_LENGTH: usize = 128;

/// Length within the rule's bounds (8..=128 by default) and at least one
/// upper-case letter, one lower-case letter and one digit.
pub fn check_password_policy(password: &str, rule: &ValidationRule) -> Result<(), SanitizeError> {
    let length = password.chars().count();
    let min = rule.min_length.unwrap_or(DEFAULT_MIN_LENGTH);
    let max = rule.max_length.unwrap_or(DEFAULT_MAX_LENGTH);

    if length < min {
        return Err(SanitizeError::Rejected {
            reason: "password is too short",
        });
    }
    if length > max {
        return Err(SanitizeError::Rejected {
            reason: "password is too long",
        });
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        return Err(SanitizeError::Rejected {
            reason: "password needs an upper-case letter, a lower-case letter and a digit",
        });
    }

    Ok(())
}

pub fn sanitize_password(value: &str, rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    check_password_policy(value, rule)?;
    Ok(FieldValue::Text(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        let rule = ValidationRule::default();
        assert!(check_password_policy("Secret123", &rule).is_ok());
        assert!(check_password_policy("Sh0rt", &rule).is_err());
        assert!(check_password_policy("alllowercase1", &rule).is_err());
        assert!(check_password_policy("ALLUPPERCASE1", &rule).is_err());
        assert!(check_password_policy("NoDigitsHere", &rule).is_err());
        assert!(check_password_policy(&format!("Aa1{}", "x".repeat(126)), &rule).is_err());
    }

    #[test]
    fn test_sanitize_password_keeps_input_verbatim() {
        let input = "  Pässw0rd with spaces  ";
        let value = sanitize_password(input, &ValidationRule::default()).unwrap();
        assert_eq!(value.as_text(), Some(input));
    }
}
