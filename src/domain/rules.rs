//! Field validation rules
//!
//! One immutable [`ValidationRule`] per [`FieldType`], collected in a
//! [`RuleTable`] that is built once at start-up. Callers adjust a rule for a
//! single field with [`RuleOverrides`]; an override wins, the base rule
//! applies otherwise.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};

use super::value_objects::FieldType;

/// Compiled regular expression that (de)serializes as its source text
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Set of characters, written as a plain string in configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharSet(BTreeSet<char>);

impl CharSet {
    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }
}

impl From<&str> for CharSet {
    fn from(value: &str) -> Self {
        Self(value.chars().collect())
    }
}

impl Serialize for CharSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.iter().collect::<String>())
    }
}

impl<'de> Deserialize<'de> for CharSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let chars = String::deserialize(deserializer)?;
        Ok(CharSet::from(chars.as_str()))
    }
}

/// Constraints for one field type
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationRule {
    pub pattern: Option<Pattern>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
    pub allowed_chars: Option<CharSet>,
    pub forbidden_chars: Option<CharSet>,
    pub forbidden_extensions: Option<Vec<String>>,
    /// Digits kept after the decimal point by numeric sanitizers
    pub fraction_digits: Option<u32>,
    /// Maximum total digit count accepted by numeric sanitizers
    pub max_digits: Option<u32>,
    pub required: bool,
}

impl ValidationRule {
    /// Apply per-call overrides: every field set in `overrides` replaces the
    /// base value.
    pub fn merged(&self, overrides: &RuleOverrides) -> ValidationRule {
        ValidationRule {
            pattern: overrides.pattern.clone().or_else(|| self.pattern.clone()),
            min_length: overrides.min_length.or(self.min_length),
            max_length: overrides.max_length.or(self.max_length),
            min_value: overrides.min_value.or(self.min_value),
            max_value: overrides.max_value.or(self.max_value),
            allowed_chars: overrides
                .allowed_chars
                .clone()
                .or_else(|| self.allowed_chars.clone()),
            forbidden_chars: overrides
                .forbidden_chars
                .clone()
                .or_else(|| self.forbidden_chars.clone()),
            forbidden_extensions: overrides
                .forbidden_extensions
                .clone()
                .or_else(|| self.forbidden_extensions.clone()),
            fraction_digits: overrides.fraction_digits.or(self.fraction_digits),
            max_digits: overrides.max_digits.or(self.max_digits),
            required: overrides.required.unwrap_or(self.required),
        }
    }
}

/// Per-call adjustments to a base rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOverrides {
    pub pattern: Option<Pattern>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
    pub allowed_chars: Option<CharSet>,
    pub forbidden_chars: Option<CharSet>,
    pub forbidden_extensions: Option<Vec<String>>,
    pub fraction_digits: Option<u32>,
    pub max_digits: Option<u32>,
    pub required: Option<bool>,
}

impl RuleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_value(mut self, min: impl Into<Decimal>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    pub fn max_value(mut self, max: impl Into<Decimal>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    /// Replace the pattern. Panics on an invalid regex, which is a
    /// programming error in a schema declaration.
    pub fn pattern(mut self, source: &str) -> Self {
        self.pattern = Some(Pattern::new(source).expect("Invalid override pattern"));
        self
    }

    pub fn allowed_chars(mut self, chars: &str) -> Self {
        self.allowed_chars = Some(CharSet::from(chars));
        self
    }

    pub fn forbidden_chars(mut self, chars: &str) -> Self {
        self.forbidden_chars = Some(CharSet::from(chars));
        self
    }

    pub fn forbidden_extensions(mut self, extensions: &[&str]) -> Self {
        self.forbidden_extensions = Some(extensions.iter().map(|e| e.to_lowercase()).collect());
        self
    }

    pub fn fraction_digits(mut self, digits: u32) -> Self {
        self.fraction_digits = Some(digits);
        self
    }

    pub fn max_digits(mut self, digits: u32) -> Self {
        self.max_digits = Some(digits);
        self
    }
}

/// Executable and script extensions rejected by the filename sanitizer
pub const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "scr", "pif", "vbs", "vbe", "js", "jse", "jar", "msi", "ps1",
    "sh", "dll", "cpl", "hta", "wsf",
];

fn pattern(source: &str) -> Option<Pattern> {
    Some(Pattern::new(source).expect("Invalid built-in rule pattern"))
}

/// Immutable mapping from field type to its base rule
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<FieldType, ValidationRule>,
}

static DEFAULT_RULES: Lazy<RuleTable> = Lazy::new(RuleTable::builtin);

impl RuleTable {
    /// Process-wide built-in table
    pub fn global() -> &'static RuleTable {
        &DEFAULT_RULES
    }

    /// Built-in rules for every field type
    pub fn builtin() -> Self {
        let mut rules = HashMap::new();

        rules.insert(
            FieldType::Text,
            ValidationRule {
                max_length: Some(255),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Name,
            ValidationRule {
                min_length: Some(1),
                max_length: Some(100),
                pattern: pattern(r"^[\p{L}\p{M}][\p{L}\p{M} '\-\.,]*$"),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Code,
            ValidationRule {
                max_length: Some(50),
                pattern: pattern(r"^[A-Za-z0-9][A-Za-z0-9_\-\.]*$"),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Description,
            ValidationRule {
                max_length: Some(2000),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Integer,
            ValidationRule {
                max_length: Some(20),
                pattern: pattern(r"^[+-]?\d+$"),
                min_value: Some(Decimal::from(i64::MIN)),
                max_value: Some(Decimal::from(i64::MAX)),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Decimal,
            ValidationRule {
                max_length: Some(40),
                pattern: pattern(r"^[+-]?(\d+(\.\d*)?|\.\d+)$"),
                fraction_digits: Some(4),
                max_digits: Some(18),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Currency,
            ValidationRule {
                max_length: Some(30),
                pattern: pattern(r"^[+-]?\$?\s?(\d{1,3}(,\d{3})+|\d+)?(\.\d+)?$"),
                fraction_digits: Some(2),
                max_digits: Some(15),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Percentage,
            ValidationRule {
                max_length: Some(12),
                pattern: pattern(r"^[+-]?(\d+(\.\d*)?|\.\d+)\s?%?$"),
                min_value: Some(Decimal::ZERO),
                max_value: Some(Decimal::ONE_HUNDRED),
                fraction_digits: Some(2),
                max_digits: Some(5),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Date,
            ValidationRule {
                max_length: Some(10),
                pattern: pattern(r"^\d{1,4}[-/]\d{1,2}[-/]\d{1,4}$"),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::DateTime,
            ValidationRule {
                max_length: Some(35),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Email,
            ValidationRule {
                min_length: Some(3),
                max_length: Some(254),
                pattern: pattern(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Phone,
            ValidationRule {
                max_length: Some(25),
                pattern: pattern(r"^\+?[\d\s\-\(\)\.]{7,24}$"),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Url,
            ValidationRule {
                min_length: Some(10),
                max_length: Some(2048),
                pattern: pattern(r#"^(?i)https?://[^\s<>"'`]+$"#),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Password,
            ValidationRule {
                min_length: Some(8),
                max_length: Some(128),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Filename,
            ValidationRule {
                max_length: Some(255),
                forbidden_chars: Some(CharSet::from("\0")),
                forbidden_extensions: Some(
                    EXECUTABLE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
                ),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::SqlIdentifier,
            ValidationRule {
                max_length: Some(64),
                pattern: pattern(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$"),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Boolean,
            ValidationRule {
                max_length: Some(5),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Status,
            ValidationRule {
                max_length: Some(30),
                pattern: pattern(r"^[A-Za-z][A-Za-z_]*$"),
                ..Default::default()
            },
        );
        rules.insert(
            FieldType::Generic,
            ValidationRule {
                max_length: Some(1000),
                ..Default::default()
            },
        );

        Self { rules }
    }

    pub fn rule_for(&self, field_type: FieldType) -> &ValidationRule {
        // Every FieldType is inserted by `builtin` and overrides only merge
        self.rules
            .get(&field_type)
            .unwrap_or_else(|| &DEFAULT_RULES.rules[&FieldType::Generic])
    }

    /// Merge start-up overrides into the table, keyed by field type
    pub fn with_overrides(mut self, overrides: HashMap<FieldType, RuleOverrides>) -> Self {
        for (field_type, rule_overrides) in overrides {
            let merged = self.rule_for(field_type).merged(&rule_overrides);
            self.rules.insert(field_type, merged);
        }
        self
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
