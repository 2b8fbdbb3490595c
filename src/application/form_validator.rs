//! Whole-record validation against a declared schema

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::input_validator::{InputValidator, ValidationOutcome};
use crate::domain::errors::ValidationError;
use crate::domain::rules::RuleOverrides;
use crate::domain::value_objects::{FieldType, FieldValue};

/// Raw submitted record, field name to JSON value
pub type FormData = serde_json::Map<String, Value>;

/// Type, rule adjustments and optional default for one schema field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub overrides: RuleOverrides,
    /// Substituted only when the submitted value is empty; the default is
    /// then validated like any submitted value.
    #[serde(default)]
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            overrides: RuleOverrides::default(),
            default: None,
        }
    }

    pub fn with_overrides(mut self, overrides: RuleOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn required(mut self) -> Self {
        self.overrides.required = Some(true);
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Field declarations for one record kind, declared once and reused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub name: String,
    pub fields: BTreeMap<String, FieldSpec>,
}

impl FormSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field_spec(name, FieldSpec::new(field_type))
    }

    pub fn field_spec(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }
}

/// Aggregated result for one record. `ok` only when every field passed;
/// failing fields have an entry in `errors` and none in `sanitized`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormOutcome {
    pub ok: bool,
    pub errors: BTreeMap<String, String>,
    pub sanitized: BTreeMap<String, FieldValue>,
}

impl FormOutcome {
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedRecord {
    pub index: usize,
    pub values: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub errors: BTreeMap<String, String>,
}

/// Result of validating a batch of records; indexes refer to input order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchOutcome {
    pub accepted: Vec<AcceptedRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// Coerce a JSON value to the string form the field pipeline expects.
/// Arrays and objects have no string form and are rejected.
fn coerce(value: Option<&Value>) -> Result<Option<String>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_)) | Some(Value::Object(_)) => Err(()),
    }
}

#[derive(Clone, Default)]
pub struct FormValidator {
    fields: InputValidator,
}

static FORM_VALIDATOR: Lazy<FormValidator> = Lazy::new(FormValidator::default);

impl FormValidator {
    pub fn new(fields: InputValidator) -> Self {
        Self { fields }
    }

    pub fn global() -> &'static FormValidator {
        &FORM_VALIDATOR
    }

    pub fn input_validator(&self) -> &InputValidator {
        &self.fields
    }

    /// Validate every schema field and every extra key of `data`.
    ///
    /// Nothing short-circuits, so all errors surface together. Keys absent
    /// from the schema go through the generic sanitizer and are kept.
    pub fn validate_form(&self, data: &FormData, schema: &FormSchema) -> FormOutcome {
        let mut outcome = FormOutcome::default();

        for (name, spec) in &schema.fields {
            let result = self.validate_field(name, data.get(name), spec, &schema.name);
            Self::record(&mut outcome, name, result);
        }

        for (name, value) in data {
            if schema.fields.contains_key(name) {
                continue;
            }
            debug!(field = %name, schema = %schema.name, "Field not in schema, using generic fallback");
            let result = self.validate_field(name, Some(value), &FieldSpec::new(FieldType::Generic), &schema.name);
            Self::record(&mut outcome, name, result);
        }

        outcome.ok = outcome.errors.is_empty();
        outcome
    }

    /// Validate each record independently; one bad record never hides
    /// the others.
    pub fn validate_batch(&self, records: &[FormData], schema: &FormSchema) -> BatchOutcome {
        let mut batch = BatchOutcome::default();

        for (index, record) in records.iter().enumerate() {
            let outcome = self.validate_form(record, schema);
            if outcome.ok {
                batch.accepted.push(AcceptedRecord {
                    index,
                    values: outcome.sanitized,
                });
            } else {
                batch.rejected.push(RejectedRecord {
                    index,
                    errors: outcome.errors,
                });
            }
        }

        info!(
            schema = %schema.name,
            accepted = batch.accepted.len(),
            rejected = batch.rejected.len(),
            "Batch validated"
        );
        batch
    }

    fn validate_field(
        &self,
        name: &str,
        value: Option<&Value>,
        spec: &FieldSpec,
        context: &str,
    ) -> Result<FieldValue, ValidationError> {
        let raw = coerce(value).map_err(|_| ValidationError::UnnormalizableValue {
            field: name.to_string(),
            reason: "expected a single value".to_string(),
        })?;

        let raw = match (raw, &spec.default) {
            (Some(raw), _) if !raw.trim().is_empty() => Some(raw),
            (_, Some(default)) => Some(default.clone()),
            (raw, None) => raw,
        };

        let outcome: ValidationOutcome = self.fields.validate_in_context(
            raw.as_deref(),
            spec.field_type,
            name,
            Some(&spec.overrides),
            Some(context),
        );
        outcome.into_result()
    }

    fn record(outcome: &mut FormOutcome, name: &str, result: Result<FieldValue, ValidationError>) {
        match result {
            Ok(value) => {
                outcome.sanitized.insert(name.to_string(), value);
            }
            Err(e) => {
                outcome.errors.insert(name.to_string(), e.to_string());
            }
        }
    }
}

/// Validate a record with the shared validator
pub fn validate_form(data: &FormData, schema: &FormSchema) -> FormOutcome {
    FormValidator::global().validate_form(data, schema)
}

pub fn validate_batch(records: &[FormData], schema: &FormSchema) -> BatchOutcome {
    FormValidator::global().validate_batch(records, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> FormData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    fn person_schema() -> FormSchema {
        FormSchema::new("person")
            .field_spec("email", FieldSpec::new(FieldType::Email).required())
            .field_spec(
                "age",
                FieldSpec::new(FieldType::Integer)
                    .with_overrides(RuleOverrides::new().min_value(0).max_value(150)),
            )
            .field("nickname", FieldType::Name)
    }

    #[test]
    fn test_two_bad_fields_give_two_errors() {
        let outcome = validate_form(
            &data(json!({"email": "not-an-email", "age": "-5"})),
            &person_schema(),
        );

        assert!(!outcome.ok);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.error_for("email").is_some());
        assert!(outcome.error_for("age").is_some());
        assert!(!outcome.sanitized.contains_key("email"));
        assert!(!outcome.sanitized.contains_key("age"));
    }

    #[test]
    fn test_valid_record() {
        let outcome = validate_form(
            &data(json!({"email": "Ana@Example.com", "age": 34})),
            &person_schema(),
        );

        assert!(outcome.ok, "{:?}", outcome.errors);
        assert_eq!(
            outcome.sanitized["email"],
            FieldValue::Text("ana@example.com".to_string())
        );
        assert_eq!(outcome.sanitized["age"], FieldValue::Integer(34));
        assert_eq!(outcome.sanitized["nickname"], FieldValue::Null);
    }

    #[test]
    fn test_missing_required_field() {
        let outcome = validate_form(&data(json!({"age": 20})), &person_schema());
        assert!(!outcome.ok);
        assert_eq!(outcome.error_for("email"), Some("Field 'email' is required"));
    }

    #[test]
    fn test_unknown_keys_are_kept_and_sanitized() {
        let outcome = validate_form(
            &data(json!({"email": "a@b.io", "legacy_note": "Fish & Chips"})),
            &person_schema(),
        );

        assert!(outcome.ok);
        assert_eq!(
            outcome.sanitized["legacy_note"],
            FieldValue::Text("Fish &amp; Chips".to_string())
        );
    }

    #[test]
    fn test_unknown_keys_are_still_screened() {
        let outcome = validate_form(
            &data(json!({"email": "a@b.io", "extra": "<script>x</script>"})),
            &person_schema(),
        );

        assert!(!outcome.ok);
        assert!(outcome.error_for("extra").is_some());
        assert!(!outcome.sanitized.contains_key("extra"));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let outcome = validate_form(
            &data(json!({"email": ["a@b.io"]})),
            &person_schema(),
        );
        assert!(outcome.error_for("email").is_some());
    }

    #[test]
    fn test_schema_default_applies_only_to_empty_values() {
        let schema = FormSchema::new("item")
            .field_spec("status", FieldSpec::new(FieldType::Status).with_default("active"));

        let defaulted = validate_form(&data(json!({"status": ""})), &schema);
        assert_eq!(defaulted.sanitized["status"], FieldValue::Text("ACTIVE".to_string()));

        let submitted = validate_form(&data(json!({"status": "retired"})), &schema);
        assert_eq!(submitted.sanitized["status"], FieldValue::Text("RETIRED".to_string()));
    }

    #[test]
    fn test_invalid_default_is_reported() {
        let schema = FormSchema::new("item")
            .field_spec("qty", FieldSpec::new(FieldType::Integer).with_default("many"));
        let outcome = validate_form(&FormData::new(), &schema);
        assert!(outcome.error_for("qty").is_some());
    }

    #[test]
    fn test_batch_reports_indexes() {
        let records = vec![
            data(json!({"email": "a@b.io", "age": 1})),
            data(json!({"email": "bad", "age": 2})),
            data(json!({"email": "c@d.io"})),
        ];

        let batch = validate_batch(&records, &person_schema());
        assert_eq!(batch.total(), 3);
        assert!(!batch.is_clean());
        assert_eq!(
            batch.accepted.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert_eq!(batch.rejected[0].index, 1);
        assert!(batch.rejected[0].errors.contains_key("email"));
    }

    #[test]
    fn test_schema_deserializes_from_toml() {
        let schema: FormSchema = toml::from_str(
            r#"
            name = "inventory"

            [fields.sku]
            type = "code"
            overrides = { required = true, max_length = 20 }

            [fields.price]
            type = "currency"
            default = "0"
            "#,
        )
        .unwrap();

        assert_eq!(schema.get("sku").unwrap().field_type, FieldType::Code);
        assert_eq!(schema.get("sku").unwrap().overrides.max_length, Some(20));
        assert_eq!(schema.get("price").unwrap().default.as_deref(), Some("0"));
    }
}
