//! # FieldGuard - Validation and Sanitization for Untrusted Field Input
//!
//! Screens field-level input before it reaches a persistence layer. Every
//! value is checked for SQL injection, XSS, path traversal and command
//! injection, validated against per-type rules and normalized into a
//! canonical value that is safe to bind as a query parameter.
//!
//! ## Architecture Layers
//!
//! - **Domain**: Field types, rule table, constraint checks, errors
//! - **Security**: Threat detector, typed sanitizers, audit trail
//! - **Application**: Field, form, batch and typed request validation
//! - **Infrastructure**: Identifier guard and query templates, path
//!   confinement, password hashing
//!
//! ## Example Usage
//!
//! ```
//! use field_guard::{validate_form, FieldSpec, FieldType, FormSchema};
//! use serde_json::json;
//!
//! let schema = FormSchema::new("employee")
//!     .field_spec("email", FieldSpec::new(FieldType::Email).required())
//!     .field("salary", FieldType::Currency);
//!
//! let data = json!({"email": "Ana@Example.com", "salary": "$1,234.5"});
//! let outcome = validate_form(data.as_object().unwrap(), &schema);
//!
//! assert!(outcome.ok);
//! assert_eq!(outcome.sanitized["salary"].to_string(), "1234.50");
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod security;
pub mod telemetry;

// Re-export key types explicitly to avoid ambiguity
pub use application::{
    validate_batch, validate_form, validate_input, validate_request, BatchOutcome, FieldSpec,
    FormData, FormErrors, FormOutcome, FormSchema, FormValidator, GuardBuilder, GuardComponents,
    InputValidator, ValidatedRequest, ValidationOutcome,
};
pub use config::{ConfigError, GuardConfig};
pub use domain::errors as domain_errors;
pub use domain::rules::{RuleOverrides, RuleTable, ValidationRule};
pub use domain::value_objects::{FieldType, FieldValue, SqlIdentifier, ThreatCategory, ThreatMatch};
pub use infrastructure::{
    resolve_within_base, PasswordHasher, PathGuard, PreparedQuery, SafeQueryTemplate,
    SqlIdentifierGuard,
};
pub use security::{AuditSink, SecurityAuditRecord, ThreatDetector, TracingAuditSink};
