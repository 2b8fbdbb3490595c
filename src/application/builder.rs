use std::sync::Arc;

use tracing::info;

use crate::application::{form_validator::FormValidator, input_validator::InputValidator};
use crate::config::{ConfigError, GuardConfig};
use crate::domain::rules::RuleTable;
use crate::domain::value_objects::FieldType;
use crate::infrastructure::crypto::PasswordHasher;
use crate::security::audit::{AuditSink, TracingAuditSink};

/// Everything a host needs, built once at start-up and shared afterwards
#[derive(Clone)]
pub struct GuardComponents {
    pub rules: Arc<RuleTable>,
    pub input_validator: InputValidator,
    pub form_validator: FormValidator,
    pub password_hasher: PasswordHasher,
}

/// Builder for the validation components
pub struct GuardBuilder {
    config: GuardConfig,
    rules: Option<RuleTable>,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl GuardBuilder {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config,
            rules: None,
            audit_sink: None,
        }
    }

    /// Use an explicit rule table instead of the configured rules file
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<GuardComponents, ConfigError> {
        self.config.validate()?;

        let rules = match self.rules {
            Some(rules) => rules,
            None => RuleTable::from_config(&self.config)?,
        };
        let rules = Arc::new(rules);

        let audit_sink = self
            .audit_sink
            .unwrap_or_else(|| Arc::new(TracingAuditSink));

        let password_hasher = PasswordHasher::from_config(&self.config)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?
            .with_policy(rules.rule_for(FieldType::Password).clone());

        let input_validator =
            InputValidator::new(rules.clone(), audit_sink, self.config.max_input_length);
        let form_validator = FormValidator::new(input_validator.clone());

        info!(
            max_input_length = self.config.max_input_length,
            password_iterations = password_hasher.iterations(),
            rules_file = ?self.config.rules_file,
            "Validation components initialized"
        );

        Ok(GuardComponents {
            rules,
            input_validator,
            form_validator,
            password_hasher,
        })
    }
}
