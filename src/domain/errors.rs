use rust_decimal::Decimal;
use thiserror::Error;

use super::value_objects::ThreatCategory;

/// Reason a single constraint check failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintKind {
    #[error("exceeds the maximum input size of {max} characters")]
    InputTooLarge { max: usize },

    #[error("must be at least {min} characters long")]
    TooShort { min: usize },

    #[error("must be at most {max} characters long")]
    TooLong { max: usize },

    #[error("must be at least {min}")]
    BelowMinimum { min: Decimal },

    #[error("must be at most {max}")]
    AboveMaximum { max: Decimal },

    #[error("contains characters that are not allowed")]
    DisallowedCharacters,

    #[error("contains a forbidden character")]
    ForbiddenCharacter,

    #[error("has an invalid format")]
    PatternMismatch,
}

/// Per-field validation failure.
///
/// `Display` output is meant for end users: it names the field and the
/// failed constraint and never includes the submitted value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    MissingRequiredField { field: String },

    #[error("Field '{field}' {kind}")]
    ConstraintViolation { field: String, kind: ConstraintKind },

    #[error("Field '{field}' could not be normalized: {reason}")]
    UnnormalizableValue { field: String, reason: String },

    #[error("Field '{field}' {}", .category.user_message())]
    ThreatDetected {
        field: String,
        category: ThreatCategory,
    },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingRequiredField { field }
            | ValidationError::ConstraintViolation { field, .. }
            | ValidationError::UnnormalizableValue { field, .. }
            | ValidationError::ThreatDetected { field, .. } => field,
        }
    }

    pub fn is_threat(&self) -> bool {
        matches!(self, ValidationError::ThreatDetected { .. })
    }

    /// Stable machine-readable tag for the error category
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { .. } => "missing_required_field",
            ValidationError::ConstraintViolation { .. } => "constraint_violation",
            ValidationError::UnnormalizableValue { .. } => "unnormalizable_value",
            ValidationError::ThreatDetected { .. } => "threat_detected",
        }
    }
}

/// A sanitizer could not represent the input in its canonical form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("expected {expected}")]
    InvalidFormat { expected: &'static str },

    #[error("{reason}")]
    Rejected { reason: &'static str },

    #[error("more than {max} digits")]
    TooManyDigits { max: u32 },

    #[error("value out of range")]
    OutOfRange,

    #[error("internal sanitizer failure")]
    Internal,
}

/// Identifier guard and query template failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(#[from] SanitizeError),

    #[error("Identifier is not allowed for {subsystem}")]
    NotAllowed { subsystem: String },

    #[error("Template placeholder '{0}' has no bound identifier")]
    UnboundPlaceholder(String),

    #[error("Template has no placeholder named '{0}'")]
    UnknownPlaceholder(String),

    #[error("Malformed query template: {0}")]
    MalformedTemplate(String),

    #[error("Statement expects {expected} parameters, got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    #[error("Rendered statement rejected: {category}")]
    UnsafeStatement { category: ThreatCategory },
}

/// Path confinement failures
#[derive(Debug, Error)]
pub enum PathGuardError {
    #[error("Base directory cannot be resolved: {0}")]
    InvalidBase(#[source] std::io::Error),

    #[error("Path cannot be resolved: {0}")]
    Unresolvable(#[source] std::io::Error),

    #[error("Path has no usable file name")]
    InvalidComponent,

    #[error("Path escapes its base directory")]
    OutsideBase,
}

/// Password policy and hashing failures
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password does not meet policy: {0}")]
    Policy(SanitizeError),

    #[error("Stored hash is malformed")]
    MalformedHash,

    #[error("Iteration count {0} is below the minimum of {min}", min = crate::infrastructure::crypto::MIN_ITERATIONS)]
    TooFewIterations(u32),

    #[error("Hashing task failed: {0}")]
    Task(String),
}
