//! Date and datetime sanitizers

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound};

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::FieldValue;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `DD/MM/YYYY` and `DD-MM-YYYY`.
/// The four-digit group decides the field order.
pub fn parse_date(value: &str) -> Result<NaiveDate, SanitizeError> {
    let invalid = SanitizeError::InvalidFormat {
        expected: "a date such as 2024-03-15",
    };

    let parts: Vec<&str> = value.trim().split(['-', '/']).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return Err(invalid);
    }

    let (year, month, day) = match (parts[0].len(), parts[2].len()) {
        (4, 1..=2) => (parts[0], parts[1], parts[2]),
        (1..=2, 4) => (parts[2], parts[1], parts[0]),
        _ => return Err(invalid),
    };

    let (Ok(year), Ok(month), Ok(day)) = (year.parse(), month.parse(), day.parse()) else {
        return Err(invalid);
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or(SanitizeError::OutOfRange)
}

pub fn sanitize_date(value: &str, _rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    parse_date(value).map(FieldValue::Date)
}

/// Sub-second precision is dropped; RFC 3339 input with an offset is
/// converted to UTC.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, SanitizeError> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_utc().trunc_subsecs(0));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.trunc_subsecs(0))
        .ok_or(SanitizeError::InvalidFormat {
            expected: "a date and time such as 2024-03-15 14:30:00",
        })
}

pub fn sanitize_datetime(
    value: &str,
    _rule: &ValidationRule,
) -> Result<FieldValue, SanitizeError> {
    parse_datetime(value).map(FieldValue::DateTime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15").unwrap(), expected);
        assert_eq!(parse_date("2024/03/15").unwrap(), expected);
        assert_eq!(parse_date("15/03/2024").unwrap(), expected);
        assert_eq!(parse_date("15-3-2024").unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date("2024-02-30"), Err(SanitizeError::OutOfRange));
        assert!(parse_date("24-03-15").is_err());
        assert!(parse_date("2024-03").is_err());
        assert!(parse_date("2024-03-15; DROP").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_sanitized_date_renders_iso() {
        let value = sanitize_date("15/03/2024", &ValidationRule::default()).unwrap();
        assert_eq!(value.to_string(), "2024-03-15");
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();

        assert_eq!(parse_datetime("2024-03-15 14:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-15T14:30:00.987").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-15 14:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-15T16:30:00+02:00").unwrap(), expected);
    }

    #[test]
    fn test_datetime_is_idempotent() {
        let rule = ValidationRule::default();
        let once = sanitize_datetime("2024-03-15T14:30:00Z", &rule).unwrap();
        let twice = sanitize_datetime(&once.to_string(), &rule).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_err());
        assert!(parse_datetime("2024-03-15 25:00").is_err());
    }
}
