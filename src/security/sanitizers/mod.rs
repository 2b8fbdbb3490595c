//! Typed sanitizers
//!
//! One pure normalize function per [`FieldType`]. Every sanitizer returns
//! either the canonical [`FieldValue`] or a [`SanitizeError`] meaning the
//! input cannot be represented; none of them passes raw input through.

pub mod contact;
pub mod credentials;
pub mod files;
pub mod numeric;
pub mod sql;
pub mod temporal;
pub mod text;

use std::panic::{self, AssertUnwindSafe};
use unicode_normalization::UnicodeNormalization;

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::{FieldType, FieldValue};

pub use contact::{sanitize_email, sanitize_phone, sanitize_url};
pub use credentials::{check_password_policy, sanitize_password};
pub use files::sanitize_filename;
pub use numeric::{sanitize_boolean, sanitize_fixed_point, sanitize_integer};
pub use sql::{sanitize_sql_identifier, sql_string_escape};
pub use temporal::{sanitize_date, sanitize_datetime};
pub use text::{
    escape_html, sanitize_code, sanitize_description, sanitize_generic, sanitize_name,
    sanitize_status, sanitize_text, unescape_html,
};

/// Dispatch from field type to sanitizer
pub struct Sanitizer;

impl Sanitizer {
    /// Form of the raw value that constraint checks and sanitizers see:
    /// NFC-normalized and trimmed. Passwords are returned untouched.
    pub fn prepare(field_type: FieldType, raw: &str) -> String {
        match field_type {
            FieldType::Password => raw.to_string(),
            _ => raw.nfc().collect::<String>().trim().to_string(),
        }
    }

    pub fn sanitize(
        field_type: FieldType,
        value: &str,
        rule: &ValidationRule,
    ) -> Result<FieldValue, SanitizeError> {
        match field_type {
            FieldType::Text => sanitize_text(value, rule),
            FieldType::Name => sanitize_name(value, rule),
            FieldType::Code => sanitize_code(value, rule),
            FieldType::Description => sanitize_description(value, rule),
            FieldType::Integer => sanitize_integer(value, rule),
            FieldType::Decimal | FieldType::Currency | FieldType::Percentage => {
                sanitize_fixed_point(value, rule)
            }
            FieldType::Date => sanitize_date(value, rule),
            FieldType::DateTime => sanitize_datetime(value, rule),
            FieldType::Email => sanitize_email(value, rule),
            FieldType::Phone => sanitize_phone(value, rule),
            FieldType::Url => sanitize_url(value, rule),
            FieldType::Password => sanitize_password(value, rule),
            FieldType::Filename => sanitize_filename(value, rule),
            FieldType::SqlIdentifier => sanitize_sql_identifier(value, rule),
            FieldType::Boolean => sanitize_boolean(value, rule),
            FieldType::Status => sanitize_status(value, rule),
            FieldType::Generic => sanitize_generic(value, rule),
        }
    }

    /// Like [`Sanitizer::sanitize`], but a panic inside a sanitizer becomes
    /// [`SanitizeError::Internal`] instead of unwinding into the caller.
    pub fn sanitize_guarded(
        field_type: FieldType,
        value: &str,
        rule: &ValidationRule,
    ) -> Result<FieldValue, SanitizeError> {
        // Sanitizers hold no state that a panic could leave half-updated
        panic::catch_unwind(AssertUnwindSafe(|| Self::sanitize(field_type, value, rule)))
            .unwrap_or(Err(SanitizeError::Internal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::RuleTable;

    #[test]
    fn test_prepare_trims_and_composes() {
        assert_eq!(Sanitizer::prepare(FieldType::Name, "  Jose\u{301} "), "José");
        assert_eq!(Sanitizer::prepare(FieldType::Password, " Secret1 "), " Secret1 ");
    }

    #[test]
    fn test_dispatch_matches_field_type() {
        let table = RuleTable::global();
        let cases = [
            (FieldType::Integer, "42", FieldValue::Integer(42)),
            (FieldType::Boolean, "no", FieldValue::Boolean(false)),
            (FieldType::Status, "active", FieldValue::Text("ACTIVE".into())),
            (FieldType::Generic, "<b>", FieldValue::Text("&lt;b&gt;".into())),
        ];

        for (field_type, input, expected) in cases {
            let value = Sanitizer::sanitize(field_type, input, table.rule_for(field_type));
            assert_eq!(value, Ok(expected), "{}", field_type);
        }
    }

    #[test]
    fn test_guarded_sanitize_passes_results_through() {
        let rule = RuleTable::global().rule_for(FieldType::Integer);
        assert_eq!(
            Sanitizer::sanitize_guarded(FieldType::Integer, "x", rule),
            Err(SanitizeError::InvalidFormat {
                expected: "a whole number"
            })
        );
    }
}
