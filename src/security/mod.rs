//! Threat detection, typed sanitizers and the security audit trail
//!
//! Everything here is pure over immutable, start-up-built tables and safe
//! to call from any number of threads without locking.

pub mod audit;
pub mod sanitizers;
pub mod threat_detector;

#[cfg(test)]
mod tests;

pub use audit::{AuditSink, SecurityAuditRecord, TracingAuditSink};
pub use sanitizers::{escape_html, sql_string_escape, Sanitizer};
pub use threat_detector::ThreatDetector;

use crate::domain::errors::SanitizeError;
use crate::domain::rules::RuleTable;
use crate::domain::value_objects::{FieldType, FieldValue, ThreatMatch};

// Convenience wrappers over the built-in rule table and the shared
// detector. Validation with rules, logging and auditing goes through
// `application::InputValidator`.

/// Scan a single value with the shared detector
pub fn detect_threat(input: &str) -> Option<ThreatMatch> {
    ThreatDetector::global().detect(input)
}

/// Sanitize `raw` as `field_type` under the built-in rule
pub fn sanitize_value(field_type: FieldType, raw: &str) -> Result<FieldValue, SanitizeError> {
    let prepared = Sanitizer::prepare(field_type, raw);
    Sanitizer::sanitize_guarded(field_type, &prepared, RuleTable::global().rule_for(field_type))
}

/// Single safe file name from an untrusted upload name or path
pub fn sanitize_filename(name: &str) -> Result<String, SanitizeError> {
    sanitize_value(FieldType::Filename, name).map(|value| value.to_string())
}

/// Check the password policy. The input is returned as-is on success.
pub fn sanitize_password(password: &str) -> Result<&str, SanitizeError> {
    sanitizers::check_password_policy(password, RuleTable::global().rule_for(FieldType::Password))?;
    Ok(password)
}
