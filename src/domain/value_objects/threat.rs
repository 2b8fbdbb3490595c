use serde::{Deserialize, Serialize};

/// Attack families recognised by the threat detector, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    SqlInjection,
    Xss,
    PathTraversal,
    CommandInjection,
}

impl ThreatCategory {
    /// Generic user-facing description; never includes the offending input
    pub fn user_message(&self) -> &'static str {
        match self {
            ThreatCategory::SqlInjection => "contains a disallowed SQL construct",
            ThreatCategory::Xss => "contains disallowed markup or script",
            ThreatCategory::PathTraversal => "contains a disallowed path sequence",
            ThreatCategory::CommandInjection => "contains disallowed shell syntax",
        }
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatCategory::SqlInjection => write!(f, "sql_injection"),
            ThreatCategory::Xss => write!(f, "xss"),
            ThreatCategory::PathTraversal => write!(f, "path_traversal"),
            ThreatCategory::CommandInjection => write!(f, "command_injection"),
        }
    }
}

/// A detector hit. Only used for logging and auditing.
///
/// `pattern` is the name of the rule that fired, not the matched text, so a
/// match can be written to logs without echoing the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatMatch {
    pub category: ThreatCategory,
    pub pattern: &'static str,
    pub field_name: Option<String>,
}

impl ThreatMatch {
    pub fn new(category: ThreatCategory, pattern: &'static str) -> Self {
        Self {
            category,
            pattern,
            field_name: None,
        }
    }

    /// Attach the field the input came from
    pub fn for_field(mut self, field_name: &str) -> Self {
        self.field_name = Some(field_name.to_string());
        self
    }
}
