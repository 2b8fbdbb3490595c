use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::error;

use super::SqlIdentifierGuard;
use crate::domain::errors::GuardError;
use crate::domain::value_objects::{FieldValue, SqlIdentifier};
use crate::security::audit::AUDIT_TARGET;
use crate::security::ThreatDetector;

static PLACEHOLDER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("Invalid placeholder name regex"));

static BIND_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\d+)").expect("Invalid bind parameter regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Statement text with `{name}` identifier placeholders and `$n` value
/// parameters.
///
/// Placeholders only ever receive identifiers that passed a
/// [`SqlIdentifierGuard`]; values are never spliced into the text and travel
/// as bound parameters in the [`PreparedQuery`]. The template is treated as
/// plain text and never evaluated.
#[derive(Debug, Clone)]
pub struct SafeQueryTemplate {
    segments: Vec<Segment>,
    bindings: HashMap<String, SqlIdentifier>,
}

/// Rendered statement plus the values to bind, in `$1..$n` order
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

impl SafeQueryTemplate {
    pub fn parse(template: &str) -> Result<Self, GuardError> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find(['{', '}']) {
            if rest[open..].starts_with('}') {
                return Err(GuardError::MalformedTemplate(
                    "unmatched '}'".to_string(),
                ));
            }

            let close = rest[open..]
                .find('}')
                .map(|offset| open + offset)
                .ok_or_else(|| GuardError::MalformedTemplate("unclosed '{'".to_string()))?;

            let name = &rest[open + 1..close];
            if !PLACEHOLDER_NAME.is_match(name) {
                return Err(GuardError::MalformedTemplate(format!(
                    "invalid placeholder name '{}'",
                    name
                )));
            }

            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            segments.push(Segment::Placeholder(name.to_string()));
            rest = &rest[close + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            segments,
            bindings: HashMap::new(),
        })
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Bind `value` to placeholder `name` after checking it against `guard`
    pub fn bind_identifier(
        &mut self,
        name: &str,
        guard: &SqlIdentifierGuard,
        value: &str,
    ) -> Result<&mut Self, GuardError> {
        if !self.placeholders().contains(&name) {
            return Err(GuardError::UnknownPlaceholder(name.to_string()));
        }

        let identifier = guard.check(value)?;
        self.bindings.insert(name.to_string(), identifier);
        Ok(self)
    }

    /// Substitute every placeholder and re-scan the complete statement.
    /// `params` must supply exactly the `$n` parameters the text uses.
    pub fn render(&self, params: Vec<FieldValue>) -> Result<PreparedQuery, GuardError> {
        let mut sql = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => sql.push_str(text),
                Segment::Placeholder(name) => {
                    let identifier = self
                        .bindings
                        .get(name)
                        .ok_or_else(|| GuardError::UnboundPlaceholder(name.clone()))?;
                    sql.push_str(&identifier.quoted());
                }
            }
        }

        let expected = BIND_PARAMETER
            .captures_iter(&sql)
            .filter_map(|caps| caps[1].parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        if expected != params.len() {
            return Err(GuardError::ParameterCount {
                expected,
                actual: params.len(),
            });
        }

        if let Some(threat) = ThreatDetector::global().scan_statement(&sql) {
            error!(
                target: AUDIT_TARGET,
                category = %threat.category,
                pattern = threat.pattern,
                "Rendered statement rejected"
            );
            return Err(GuardError::UnsafeStatement {
                category: threat.category,
            });
        }

        Ok(PreparedQuery { sql, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ThreatCategory;

    fn guard() -> SqlIdentifierGuard {
        SqlIdentifierGuard::new("inventory", ["productos_obra", "cantidad", "bodega_id"]).unwrap()
    }

    #[test]
    fn test_render_with_bound_identifiers() {
        let mut template =
            SafeQueryTemplate::parse("SELECT {column} FROM {table} WHERE bodega_id = $1").unwrap();
        template
            .bind_identifier("table", &guard(), "productos_obra")
            .unwrap()
            .bind_identifier("column", &guard(), "cantidad")
            .unwrap();

        let query = template.render(vec![FieldValue::Integer(7)]).unwrap();
        assert_eq!(
            query.sql,
            r#"SELECT "cantidad" FROM "productos_obra" WHERE bodega_id = $1"#
        );
        assert_eq!(query.params, vec![FieldValue::Integer(7)]);
    }

    #[test]
    fn test_dml_templates_are_accepted() {
        let mut template =
            SafeQueryTemplate::parse("DELETE FROM {table} WHERE id = $1").unwrap();
        template
            .bind_identifier("table", &guard(), "productos_obra")
            .unwrap();
        assert!(template.render(vec![FieldValue::Integer(1)]).is_ok());
    }

    #[test]
    fn test_placeholders() {
        let template = SafeQueryTemplate::parse("SELECT {a}, {b} FROM {t} ORDER BY {a}").unwrap();
        assert_eq!(template.placeholders(), vec!["a", "b", "t"]);
    }

    #[test]
    fn test_unbound_and_unknown_placeholders() {
        let mut template = SafeQueryTemplate::parse("SELECT * FROM {table}").unwrap();
        assert_eq!(
            template.render(vec![]),
            Err(GuardError::UnboundPlaceholder("table".to_string()))
        );
        assert!(matches!(
            template.bind_identifier("column", &guard(), "cantidad"),
            Err(GuardError::UnknownPlaceholder(_))
        ));
    }

    #[test]
    fn test_guard_rejections_propagate() {
        let mut template = SafeQueryTemplate::parse("SELECT * FROM {table}").unwrap();
        assert!(matches!(
            template.bind_identifier("table", &guard(), "usuarios"),
            Err(GuardError::NotAllowed { .. })
        ));
        assert!(matches!(
            template.bind_identifier("table", &guard(), "x; DROP TABLE y"),
            Err(GuardError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_malformed_templates() {
        for template in ["SELECT {table", "SELECT table}", "SELECT {Table}", "SELECT {}"] {
            assert!(
                matches!(
                    SafeQueryTemplate::parse(template),
                    Err(GuardError::MalformedTemplate(_))
                ),
                "Should be malformed: {}",
                template
            );
        }
    }

    #[test]
    fn test_parameter_count_must_match() {
        let template = SafeQueryTemplate::parse("SELECT 1 WHERE a = $1 AND b = $2").unwrap();
        assert_eq!(
            template.render(vec![FieldValue::Integer(1)]),
            Err(GuardError::ParameterCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_compound_statement_is_rejected_after_substitution() {
        let mut template =
            SafeQueryTemplate::parse("SELECT * FROM {table}; DELETE FROM {table}").unwrap();
        template
            .bind_identifier("table", &guard(), "productos_obra")
            .unwrap();
        assert_eq!(
            template.render(vec![]),
            Err(GuardError::UnsafeStatement {
                category: ThreatCategory::SqlInjection
            })
        );
    }

    #[test]
    fn test_comment_in_template_is_rejected() {
        let template = SafeQueryTemplate::parse("SELECT * FROM t -- trailing").unwrap();
        assert!(matches!(
            template.render(vec![]),
            Err(GuardError::UnsafeStatement { .. })
        ));
    }
}
