use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::rules::{RuleOverrides, RuleTable};
use crate::domain::value_objects::FieldType;
use crate::infrastructure::crypto::MIN_ITERATIONS;

/// Upper bound on a single field value, in characters
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Cannot read rules file {path}: {source}")]
    RulesFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse rules file: {0}")]
    RulesFileParse(#[from] toml::de::Error),

    #[error("Unknown field type '{0}' in rules file")]
    UnknownFieldType(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    pub max_input_length: usize,
    pub password_iterations: u32,
    /// TOML file with `[rules.<field_type>]` override tables
    pub rules_file: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            password_iterations: MIN_ITERATIONS,
            rules_file: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl GuardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_input_length: lookup("FIELD_GUARD_MAX_INPUT_LENGTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_input_length),
            password_iterations: lookup("FIELD_GUARD_PBKDF2_ITERATIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.password_iterations),
            rules_file: lookup("FIELD_GUARD_RULES_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            log_level: lookup("FIELD_GUARD_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: lookup("FIELD_GUARD_LOG_JSON")
                .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_length == 0 {
            return Err(ConfigError::Invalid(
                "FIELD_GUARD_MAX_INPUT_LENGTH must be greater than zero".to_string(),
            ));
        }

        if self.password_iterations < MIN_ITERATIONS {
            return Err(ConfigError::Invalid(format!(
                "FIELD_GUARD_PBKDF2_ITERATIONS must be at least {}",
                MIN_ITERATIONS
            )));
        }

        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "FIELD_GUARD_LOG_LEVEL cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// On-disk layout of the rules file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    #[serde(default)]
    rules: HashMap<String, RuleOverrides>,
}

impl RuleTable {
    /// Built-in table merged with the configured rules file, if any
    pub fn from_config(config: &GuardConfig) -> Result<Self, ConfigError> {
        match &config.rules_file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::RulesFileIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Unknown field type names are an error; a typo must not silently
    /// leave a type on its built-in rule.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: RulesFile = toml::from_str(contents)?;

        let mut overrides = HashMap::new();
        for (name, rule_overrides) in file.rules {
            let field_type: FieldType = name
                .parse()
                .map_err(|_| ConfigError::UnknownFieldType(name.clone()))?;
            overrides.insert(field_type, rule_overrides);
        }

        tracing::debug!(overridden = overrides.len(), "Loaded validation rule overrides");
        Ok(Self::builtin().with_overrides(overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GuardConfig::from_lookup(|_| None);
        assert_eq!(config, GuardConfig::default());
        assert_eq!(config.max_input_length, 10_000);
        assert_eq!(config.password_iterations, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = GuardConfig::from_lookup(lookup_from(&[
            ("FIELD_GUARD_MAX_INPUT_LENGTH", "2048"),
            ("FIELD_GUARD_PBKDF2_ITERATIONS", "250000"),
            ("FIELD_GUARD_LOG_JSON", "true"),
            ("FIELD_GUARD_LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.max_input_length, 2048);
        assert_eq!(config.password_iterations, 250_000);
        assert!(config.log_json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = GuardConfig::from_lookup(lookup_from(&[("FIELD_GUARD_MAX_INPUT_LENGTH", "lots")]));
        assert_eq!(config.max_input_length, DEFAULT_MAX_INPUT_LENGTH);
    }

    #[test]
    fn test_validate_rejects_weak_iterations() {
        let config = GuardConfig {
            password_iterations: 1_000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rule_table_from_toml() {
        let table = RuleTable::from_toml_str(
            r#"
            [rules.text]
            max_length = 80

            [rules.currency]
            max_value = "1000000"
            required = true
            "#,
        )
        .unwrap();

        assert_eq!(table.rule_for(FieldType::Text).max_length, Some(80));
        assert!(table.rule_for(FieldType::Currency).required);
        assert_eq!(table.rule_for(FieldType::Currency).fraction_digits, Some(2));
    }

    #[test]
    fn test_rule_table_rejects_unknown_type() {
        let result = RuleTable::from_toml_str("[rules.colour]\nmax_length = 3\n");
        assert!(matches!(result, Err(ConfigError::UnknownFieldType(name)) if name == "colour"));
    }

    #[test]
    fn test_rule_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rules.name]\nmax_length = 40").unwrap();

        let config = GuardConfig {
            rules_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let table = RuleTable::from_config(&config).unwrap();
        assert_eq!(table.rule_for(FieldType::Name).max_length, Some(40));
    }

    #[test]
    fn test_missing_rules_file_is_an_error() {
        let config = GuardConfig {
            rules_file: Some(PathBuf::from("/nonexistent/field_guard_rules.toml")),
            ..Default::default()
        };
        assert!(matches!(
            RuleTable::from_config(&config),
            Err(ConfigError::RulesFileIo { .. })
        ));
    }
}
