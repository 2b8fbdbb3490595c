//! Tests for the security facade and sanitizer interplay

mod facade_tests {
    use super::super::{detect_threat, sanitize_filename, sanitize_password, sanitize_value};
    use crate::domain::errors::SanitizeError;
    use crate::domain::value_objects::{FieldType, FieldValue, ThreatCategory};

    #[test]
    fn test_detect_threat() {
        let found = detect_threat("<script>alert('xss')</script>").unwrap();
        assert_eq!(found.category, ThreatCategory::Xss);
        assert!(detect_threat("normal text").is_none());
    }

    #[test]
    fn test_sanitize_value_prepares_input() {
        assert_eq!(
            sanitize_value(FieldType::Integer, "  42  "),
            Ok(FieldValue::Integer(42))
        );
        assert_eq!(
            sanitize_value(FieldType::Email, " Ana@Example.org "),
            Ok(FieldValue::Text("ana@example.org".to_string()))
        );
    }

    #[test]
    fn test_sanitize_filename_has_no_separators() {
        let name = sanitize_filename("../../etc/passwd").unwrap();
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
        assert!(!name.split('/').any(|segment| segment == ".."));
    }

    #[test]
    fn test_sanitize_password_never_mutates() {
        let password = " Tr1cky Pass ";
        assert_eq!(sanitize_password(password), Ok(password));
        assert!(matches!(
            sanitize_password("password"),
            Err(SanitizeError::Rejected { .. })
        ));
    }
}

mod idempotence_tests {
    use crate::application::input_validator::{InputValidator, ValidationOutcome};
    use crate::domain::rules::RuleTable;
    use crate::domain::value_objects::FieldType;
    use crate::security::Sanitizer;

    const SAMPLES: [(FieldType, &str); 20] = [
        (FieldType::Text, "Quarterly report"),
        (FieldType::Name, "Ana María"),
        (FieldType::Code, "sku-001"),
        (FieldType::Description, "Line one\nLine two"),
        (FieldType::Integer, "-17"),
        (FieldType::Decimal, "3.14159"),
        (FieldType::Currency, "$1,234.567"),
        (FieldType::Percentage, "12.5%"),
        (FieldType::Date, "31/12/2023"),
        (FieldType::DateTime, "2023-12-31T23:59:59.5Z"),
        (FieldType::Email, "Someone@Example.com"),
        (FieldType::Phone, "+44 20 7946 0958"),
        (FieldType::Url, "https://Example.com/docs"),
        (FieldType::Password, "Secret123"),
        (FieldType::Filename, "invoice 2023.pdf"),
        (FieldType::SqlIdentifier, "order_items"),
        (FieldType::Boolean, "yes"),
        (FieldType::Status, "in_progress"),
        (FieldType::Generic, "Fish & Chips"),
        (FieldType::Generic, "Name & ID 'draft'"),
    ];

    fn twice(field_type: FieldType, input: &str) {
        let rule = RuleTable::global().rule_for(field_type);
        let once = Sanitizer::sanitize(field_type, input, rule)
            .unwrap_or_else(|e| panic!("{} rejected {:?}: {}", field_type, input, e));
        let again = Sanitizer::sanitize(field_type, &once.to_string(), rule)
            .unwrap_or_else(|e| panic!("{} rejected its own output {}: {}", field_type, once, e));
        assert_eq!(once, again, "{} is not idempotent for {:?}", field_type, input);
    }

    #[test]
    fn test_every_field_type_is_idempotent() {
        for (field_type, input) in SAMPLES {
            twice(field_type, input);
        }
    }

    #[test]
    fn test_every_field_type_validates_again() {
        let validator = InputValidator::default();
        for (field_type, input) in SAMPLES {
            let once = match validator.validate_input(Some(input), field_type, "field", None) {
                ValidationOutcome::Valid(value) => value,
                other => panic!("{} rejected {:?}: {:?}", field_type, input, other),
            };
            let again =
                validator.validate_input(Some(&once.to_string()), field_type, "field", None);
            assert_eq!(
                again,
                ValidationOutcome::Valid(once),
                "{} does not validate its own output for {:?}",
                field_type,
                input
            );
        }
    }
}

mod detector_sanitizer_interplay_tests {
    use crate::security::{escape_html, sql_string_escape, ThreatDetector};

    #[test]
    fn test_escaped_markup_is_still_flagged() {
        // Escaping is for output contexts; the detector still treats encoded
        // script tags as hostile input
        let escaped = escape_html("<script>");
        assert!(ThreatDetector::global().detect(&escaped).is_some());
    }

    #[test]
    fn test_sql_escape_is_not_a_substitute_for_detection() {
        let payload = "' OR '1'='1";
        assert_eq!(sql_string_escape(payload), "'' OR ''1''=''1");
        assert!(ThreatDetector::global().detect(payload).is_some());
    }
}
