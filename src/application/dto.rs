use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use super::form_validator::{FormSchema, FormValidator};

/// Key used in [`FormErrors`] for failures that concern the request as a
/// whole rather than one field
pub const REQUEST_ERROR_KEY: &str = "_request";

/// Per-field messages of a rejected request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed for {} field(s)", .errors.len())]
pub struct FormErrors {
    pub errors: BTreeMap<String, String>,
}

impl FormErrors {
    fn request(message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(REQUEST_ERROR_KEY.to_string(), message.into());
        Self { errors }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Typed request struct with an explicit schema.
///
/// `validated` runs the form pipeline over the serialized request and
/// rebuilds the struct from the sanitized values.
///
/// ```
/// use field_guard::application::dto::ValidatedRequest;
/// use field_guard::application::form_validator::{FieldSpec, FormSchema};
/// use field_guard::domain::value_objects::FieldType;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct CreateSupplier {
///     name: String,
///     email: String,
/// }
///
/// impl ValidatedRequest for CreateSupplier {
///     fn schema() -> FormSchema {
///         FormSchema::new("supplier")
///             .field_spec("name", FieldSpec::new(FieldType::Name).required())
///             .field_spec("email", FieldSpec::new(FieldType::Email).required())
///     }
/// }
///
/// let request = CreateSupplier {
///     name: "  Acme   Tools ".to_string(),
///     email: "Sales@Acme.example".to_string(),
/// };
/// let clean = request.validated().unwrap();
/// assert_eq!(clean.name, "Acme Tools");
/// assert_eq!(clean.email, "sales@acme.example");
/// ```
pub trait ValidatedRequest: Serialize + DeserializeOwned {
    fn schema() -> FormSchema;

    fn validated(&self) -> Result<Self, FormErrors> {
        validate_request(self, &Self::schema())
    }
}

/// Validate any serializable request against `schema` with the shared
/// validator
pub fn validate_request<T>(request: &T, schema: &FormSchema) -> Result<T, FormErrors>
where
    T: Serialize + DeserializeOwned,
{
    validate_request_with(FormValidator::global(), request, schema)
}

pub fn validate_request_with<T>(
    validator: &FormValidator,
    request: &T,
    schema: &FormSchema,
) -> Result<T, FormErrors>
where
    T: Serialize + DeserializeOwned,
{
    let mut data = match serde_json::to_value(request) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(FormErrors::request("request must be a record")),
        Err(e) => return Err(FormErrors::request(e.to_string())),
    };

    let outcome = validator.validate_form(&data, schema);
    if !outcome.ok {
        return Err(FormErrors {
            errors: outcome.errors,
        });
    }

    for (name, value) in &outcome.sanitized {
        data.insert(name.clone(), value.to_json());
    }

    serde_json::from_value(Value::Object(data)).map_err(|e| FormErrors::request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::form_validator::FieldSpec;
    use crate::domain::rules::RuleOverrides;
    use crate::domain::value_objects::FieldType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct CreateItem {
        sku: String,
        price: Decimal,
        quantity: i64,
        received: NaiveDate,
        notes: Option<String>,
    }

    impl ValidatedRequest for CreateItem {
        fn schema() -> FormSchema {
            FormSchema::new("inventory_item")
                .field_spec("sku", FieldSpec::new(FieldType::Code).required())
                .field_spec("price", FieldSpec::new(FieldType::Currency).required())
                .field_spec(
                    "quantity",
                    FieldSpec::new(FieldType::Integer)
                        .with_overrides(RuleOverrides::new().min_value(0)),
                )
                .field("received", FieldType::Date)
                .field("notes", FieldType::Description)
        }
    }

    fn item() -> CreateItem {
        CreateItem {
            sku: "ab-100".to_string(),
            price: Decimal::new(19999, 3),
            quantity: 4,
            received: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_validated_request_is_sanitized() {
        let clean = item().validated().unwrap();
        assert_eq!(clean.sku, "AB-100");
        assert_eq!(clean.price, Decimal::new(2000, 2));
        assert_eq!(clean.quantity, 4);
        assert_eq!(clean.notes, None);
    }

    #[test]
    fn test_rejected_request_lists_fields() {
        let bad = CreateItem {
            quantity: -1,
            sku: "'; DROP TABLE items; --".to_string(),
            ..item()
        };

        let errors = bad.validated().unwrap_err();
        assert_eq!(errors.errors.len(), 2);
        assert!(errors.get("quantity").is_some());
        assert!(errors.get("sku").is_some());
        assert_eq!(errors.to_string(), "Validation failed for 2 field(s)");
    }

    #[test]
    fn test_non_record_request() {
        let errors = validate_request(&vec![1, 2, 3], &FormSchema::new("list")).unwrap_err();
        assert!(errors.get(REQUEST_ERROR_KEY).is_some());
    }
}
