//! Security audit trail
//!
//! Every detected attack produces a [`SecurityAuditRecord`] that is handed
//! to the configured [`AuditSink`]. Records carry the matched pattern name,
//! the field and the caller context, never the submitted payload.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::domain::value_objects::{ThreatCategory, ThreatMatch};

/// Target used for every security audit log line
pub const AUDIT_TARGET: &str = "security_audit";

/// Audit entry for one detected attack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityAuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: ThreatCategory,
    pub pattern: &'static str,
    pub field_name: String,
    /// Record kind or operation the input was submitted for
    pub context: Option<String>,
    /// Character count of the rejected input
    pub input_length: usize,
}

impl SecurityAuditRecord {
    pub fn new(threat: &ThreatMatch, field_name: &str, context: Option<&str>, input: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            category: threat.category,
            pattern: threat.pattern,
            field_name: field_name.to_string(),
            context: context.map(str::to_string),
            input_length: input.chars().count(),
        }
    }
}

/// Destination for security audit records.
///
/// Called synchronously from the validation path, so implementations must
/// not block; hand the record off to a channel if the backend is slow.
#[cfg_attr(test, mockall::automock)]
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &SecurityAuditRecord);
}

/// Default sink: one `error!` event on the `security_audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &SecurityAuditRecord) {
        error!(
            target: AUDIT_TARGET,
            audit_id = %record.id,
            category = %record.category,
            pattern = record.pattern,
            field = %record.field_name,
            context = record.context.as_deref().unwrap_or("-"),
            input_length = record.input_length,
            "Potential attack blocked"
        );
    }
}
