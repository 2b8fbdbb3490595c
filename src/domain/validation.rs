//! Constraint checks for a single prepared field value
//!
//! The checks run in a fixed order (length, numeric bounds, allowed
//! characters, forbidden characters, pattern) and the first failure is the
//! one reported for the field.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::errors::ConstraintKind;
use super::rules::{CharSet, Pattern, ValidationRule};

/// Validation result type
pub type ConstraintResult = Result<(), ConstraintKind>;

/// Common validation utilities
pub struct Validation;

impl Validation {
    /// Validate string length constraints, counted in characters
    pub fn validate_length(
        value: &str,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> ConstraintResult {
        let len = value.chars().count();

        if let Some(min) = min_length {
            if len < min {
                return Err(ConstraintKind::TooShort { min });
            }
        }

        if let Some(max) = max_length {
            if len > max {
                return Err(ConstraintKind::TooLong { max });
            }
        }

        Ok(())
    }

    /// Validate that a value is within a numeric range
    pub fn validate_range(
        value: Decimal,
        min: Option<Decimal>,
        max: Option<Decimal>,
    ) -> ConstraintResult {
        if let Some(min_val) = min {
            if value < min_val {
                return Err(ConstraintKind::BelowMinimum { min: min_val });
            }
        }

        if let Some(max_val) = max {
            if value > max_val {
                return Err(ConstraintKind::AboveMaximum { max: max_val });
            }
        }

        Ok(())
    }

    /// Every character must be in the allow-list
    pub fn validate_allowed_chars(value: &str, allowed: &CharSet) -> ConstraintResult {
        if value.chars().all(|c| allowed.contains(c)) {
            Ok(())
        } else {
            Err(ConstraintKind::DisallowedCharacters)
        }
    }

    /// No character may be in the deny-list
    pub fn validate_forbidden_chars(value: &str, forbidden: &CharSet) -> ConstraintResult {
        if value.chars().any(|c| forbidden.contains(c)) {
            Err(ConstraintKind::ForbiddenCharacter)
        } else {
            Ok(())
        }
    }

    pub fn validate_pattern(value: &str, pattern: &Pattern) -> ConstraintResult {
        if pattern.is_match(value) {
            Ok(())
        } else {
            Err(ConstraintKind::PatternMismatch)
        }
    }

    /// Numeric reading of a value for bound checks: currency symbols,
    /// thousands separators, percent signs and spaces are ignored.
    pub fn numeric_view(value: &str) -> Option<Decimal> {
        let cleaned: String = value
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        Decimal::from_str(&cleaned).ok()
    }

    /// Run every constraint of `rule` against `value`, first failure wins
    pub fn check_rule(value: &str, rule: &ValidationRule) -> ConstraintResult {
        Self::validate_length(value, rule.min_length, rule.max_length)?;

        if rule.min_value.is_some() || rule.max_value.is_some() {
            if let Some(number) = Self::numeric_view(value) {
                Self::validate_range(number, rule.min_value, rule.max_value)?;
            }
        }

        if let Some(allowed) = &rule.allowed_chars {
            Self::validate_allowed_chars(value, allowed)?;
        }

        if let Some(forbidden) = &rule.forbidden_chars {
            Self::validate_forbidden_chars(value, forbidden)?;
        }

        if let Some(pattern) = &rule.pattern {
            Self::validate_pattern(value, pattern)?;
        }

        Ok(())
    }
}
