//! Single-field validation pipeline
//!
//! Order of work for one value: empty check, global size ceiling, threat
//! scan on the raw input, rule merge, constraint checks on the prepared
//! value, then the type's sanitizer. Sanitized text is scanned once more,
//! since stripping or truncating can turn clean input into a match. The
//! first failing step decides the outcome.

use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::{GuardConfig, DEFAULT_MAX_INPUT_LENGTH};
use crate::domain::errors::{ConstraintKind, SanitizeError, ValidationError};
use crate::domain::rules::{RuleOverrides, RuleTable};
use crate::domain::validation::Validation;
use crate::domain::value_objects::{FieldType, FieldValue, ThreatMatch};
use crate::security::audit::{AuditSink, SecurityAuditRecord, TracingAuditSink};
use crate::security::{Sanitizer, ThreatDetector};

/// Result of validating one field
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Accepted; the canonical value to bind
    Valid(FieldValue),
    /// Absent or blank, and not required
    Empty,
    Invalid(ValidationError),
}

impl ValidationOutcome {
    pub fn is_ok(&self) -> bool {
        !matches!(self, ValidationOutcome::Invalid(_))
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationOutcome::Invalid(e) => Some(e),
            _ => None,
        }
    }

    /// User-facing message; never contains the submitted value
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn sanitized_value(&self) -> Option<&FieldValue> {
        match self {
            ValidationOutcome::Valid(value) => Some(value),
            _ => None,
        }
    }

    /// `Empty` becomes [`FieldValue::Null`]
    pub fn into_result(self) -> Result<FieldValue, ValidationError> {
        match self {
            ValidationOutcome::Valid(value) => Ok(value),
            ValidationOutcome::Empty => Ok(FieldValue::Null),
            ValidationOutcome::Invalid(e) => Err(e),
        }
    }
}

/// Validates and sanitizes single field values.
///
/// Holds only immutable state, so one instance can be shared across
/// threads; clones share the rule table and the audit sink.
#[derive(Clone)]
pub struct InputValidator {
    rules: Arc<RuleTable>,
    detector: &'static ThreatDetector,
    audit: Arc<dyn AuditSink>,
    max_input_length: usize,
}

static VALIDATOR: Lazy<InputValidator> = Lazy::new(InputValidator::default);

impl InputValidator {
    pub fn new(rules: Arc<RuleTable>, audit: Arc<dyn AuditSink>, max_input_length: usize) -> Self {
        Self {
            rules,
            detector: ThreatDetector::global(),
            audit,
            max_input_length,
        }
    }

    pub fn from_config(config: &GuardConfig, rules: Arc<RuleTable>) -> Self {
        Self::new(rules, Arc::new(TracingAuditSink), config.max_input_length)
    }

    /// Built-in rules, tracing audit sink, default size ceiling
    pub fn global() -> &'static InputValidator {
        &VALIDATOR
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn max_input_length(&self) -> usize {
        self.max_input_length
    }

    pub fn validate_input(
        &self,
        value: Option<&str>,
        field_type: FieldType,
        field_name: &str,
        extra_rules: Option<&RuleOverrides>,
    ) -> ValidationOutcome {
        self.validate_in_context(value, field_type, field_name, extra_rules, None)
    }

    /// Same as [`InputValidator::validate_input`], with the record kind or
    /// operation recorded in logs and audit records.
    pub fn validate_in_context(
        &self,
        value: Option<&str>,
        field_type: FieldType,
        field_name: &str,
        extra_rules: Option<&RuleOverrides>,
        context: Option<&str>,
    ) -> ValidationOutcome {
        let base = self.rules.rule_for(field_type);
        let merged;
        let rule = match extra_rules {
            Some(overrides) => {
                merged = base.merged(overrides);
                &merged
            }
            None => base,
        };

        let raw = match value {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ if rule.required => {
                warn!(field = %field_name, context = context.unwrap_or("-"), "Required field is empty");
                return ValidationOutcome::Invalid(ValidationError::MissingRequiredField {
                    field: field_name.to_string(),
                });
            }
            _ => return ValidationOutcome::Empty,
        };

        if raw.chars().nth(self.max_input_length).is_some() {
            warn!(
                field = %field_name,
                context = context.unwrap_or("-"),
                max = self.max_input_length,
                "Input exceeds the global size ceiling"
            );
            return ValidationOutcome::Invalid(ValidationError::ConstraintViolation {
                field: field_name.to_string(),
                kind: ConstraintKind::InputTooLarge {
                    max: self.max_input_length,
                },
            });
        }

        if let Some(threat) = self.detector.detect(raw) {
            return self.reject_threat(threat, field_name, context, raw);
        }

        let prepared = Sanitizer::prepare(field_type, raw);

        if let Err(kind) = Validation::check_rule(&prepared, rule) {
            warn!(
                field = %field_name,
                field_type = %field_type,
                context = context.unwrap_or("-"),
                constraint = %kind,
                "Field failed validation"
            );
            return ValidationOutcome::Invalid(ValidationError::ConstraintViolation {
                field: field_name.to_string(),
                kind,
            });
        }

        if field_type == FieldType::Generic {
            debug!(field = %field_name, "Using generic fallback sanitizer");
        }

        match Sanitizer::sanitize_guarded(field_type, &prepared, rule) {
            Ok(sanitized) => match sanitized.as_text().and_then(|text| self.detector.detect(text)) {
                Some(threat) => self.reject_threat(threat, field_name, context, raw),
                None => ValidationOutcome::Valid(sanitized),
            },
            Err(e) => {
                if e == SanitizeError::Internal {
                    error!(field = %field_name, field_type = %field_type, "Sanitizer panicked");
                } else {
                    warn!(
                        field = %field_name,
                        field_type = %field_type,
                        context = context.unwrap_or("-"),
                        reason = %e,
                        "Field could not be normalized"
                    );
                }
                ValidationOutcome::Invalid(ValidationError::UnnormalizableValue {
                    field: field_name.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn reject_threat(
        &self,
        threat: ThreatMatch,
        field_name: &str,
        context: Option<&str>,
        raw: &str,
    ) -> ValidationOutcome {
        let threat = threat.for_field(field_name);
        warn!(
            field = %field_name,
            category = %threat.category,
            context = context.unwrap_or("-"),
            "Input rejected by threat detector"
        );
        self.audit
            .record(&SecurityAuditRecord::new(&threat, field_name, context, raw));
        ValidationOutcome::Invalid(ValidationError::ThreatDetected {
            field: field_name.to_string(),
            category: threat.category,
        })
    }

    /// Validate with a field type given by name. Unrecognised names use the
    /// generic fallback.
    pub fn validate_named(
        &self,
        value: Option<&str>,
        type_name: &str,
        field_name: &str,
        extra_rules: Option<&RuleOverrides>,
    ) -> ValidationOutcome {
        self.validate_input(value, FieldType::parse_lenient(type_name), field_name, extra_rules)
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(
            Arc::new(RuleTable::builtin()),
            Arc::new(TracingAuditSink),
            DEFAULT_MAX_INPUT_LENGTH,
        )
    }
}

/// Validate one value with the shared validator
pub fn validate_input(
    value: Option<&str>,
    field_type: FieldType,
    field_name: &str,
    extra_rules: Option<&RuleOverrides>,
) -> ValidationOutcome {
    InputValidator::global().validate_input(value, field_type, field_name, extra_rules)
}
