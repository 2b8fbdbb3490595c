//! SQL identifier sanitizer and string-literal escaping

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::{FieldValue, SqlIdentifier};

pub fn sanitize_sql_identifier(
    value: &str,
    _rule: &ValidationRule,
) -> Result<FieldValue, SanitizeError> {
    SqlIdentifier::new(value.trim()).map(|identifier| FieldValue::Text(identifier.into_inner()))
}

/// Double single quotes and drop control characters.
///
/// Defense in depth only. Values reach the database as bound parameters;
/// this exists for the rare literal that must be embedded in a statement.
pub fn sql_string_escape(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control())
        .fold(String::with_capacity(input.len()), |mut escaped, c| {
            if c == '\'' {
                escaped.push_str("''");
            } else {
                escaped.push(c);
            }
            escaped
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sql_identifier() {
        let rule = ValidationRule::default();
        assert_eq!(
            sanitize_sql_identifier(" productos_obra ", &rule).unwrap(),
            FieldValue::Text("productos_obra".to_string())
        );
        assert!(sanitize_sql_identifier("users; DROP TABLE x", &rule).is_err());
        assert!(sanitize_sql_identifier("select", &rule).is_err());
        assert!(sanitize_sql_identifier("1table", &rule).is_err());
    }

    #[test]
    fn test_sql_string_escape() {
        assert_eq!(sql_string_escape("O'Brien"), "O''Brien");
        assert_eq!(sql_string_escape("a\0b\x1bc"), "abc");
        assert_eq!(sql_string_escape("'; --"), "''; --");
        assert_eq!(sql_string_escape(""), "");
    }
}
