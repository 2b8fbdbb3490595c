//! Integer, fixed-point and boolean sanitizers
//!
//! Fixed-point values are parsed with `rust_decimal`, never through binary
//! floating point, then quantized to the rule's fraction digits using
//! half-away-from-zero rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::domain::errors::SanitizeError;
use crate::domain::rules::ValidationRule;
use crate::domain::value_objects::FieldValue;

const DEFAULT_FRACTION_DIGITS: u32 = 2;
const DEFAULT_MAX_DIGITS: u32 = 28;

pub fn sanitize_integer(value: &str, _rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    let digits = cleaned.strip_prefix('-').unwrap_or(cleaned);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(SanitizeError::InvalidFormat {
            expected: "a whole number",
        });
    }

    cleaned
        .parse::<i64>()
        .map(FieldValue::Integer)
        .map_err(|_| SanitizeError::OutOfRange)
}

/// Decimal, currency and percentage values
pub fn sanitize_fixed_point(
    value: &str,
    rule: &ValidationRule,
) -> Result<FieldValue, SanitizeError> {
    let parsed = parse_decimal(value).ok_or(SanitizeError::InvalidFormat {
        expected: "a decimal number",
    })?;

    let scale = rule.fraction_digits.unwrap_or(DEFAULT_FRACTION_DIGITS);
    let max_digits = rule.max_digits.unwrap_or(DEFAULT_MAX_DIGITS);

    let quantized = quantize(parsed, scale);
    if digit_count(&quantized) > max_digits {
        return Err(SanitizeError::TooManyDigits { max: max_digits });
    }

    Ok(FieldValue::Decimal(quantized))
}

/// Parse user-entered numbers such as `$1,234.50`, `12.`, `.5` or `45 %`
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let mut cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();

    if cleaned.ends_with('.') {
        cleaned.pop();
    }
    if let Some(rest) = cleaned.strip_prefix('+') {
        cleaned = rest.to_string();
    }
    if cleaned.starts_with('.') {
        cleaned.insert(0, '0');
    } else if cleaned.starts_with("-.") {
        cleaned.insert(1, '0');
    }

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Round half away from zero to `scale` fraction digits and pad to exactly
/// that many.
pub fn quantize(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Total number of significant digit positions (integer plus fraction)
pub fn digit_count(value: &Decimal) -> u32 {
    value.mantissa().unsigned_abs().to_string().len() as u32
}

pub fn sanitize_boolean(value: &str, _rule: &ValidationRule) -> Result<FieldValue, SanitizeError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "si" | "sí" | "on" => Ok(FieldValue::Boolean(true)),
        "false" | "0" | "no" | "n" | "off" => Ok(FieldValue::Boolean(false)),
        _ => Err(SanitizeError::InvalidFormat {
            expected: "true or false",
        }),
    }
}
