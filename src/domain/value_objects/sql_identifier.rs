use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::domain::errors::SanitizeError;

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("Invalid regex pattern for SQL identifiers")
});

/// Keywords that are never accepted as a table or column name
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "add", "all", "alter", "and", "any", "as", "asc", "between", "by", "case", "cast",
        "check", "column", "commit", "constraint", "create", "cross", "database", "default",
        "delete", "desc", "distinct", "drop", "else", "end", "exec", "execute", "exists",
        "false", "fetch", "for", "foreign", "from", "full", "grant", "group", "having", "in",
        "index", "inner", "insert", "intersect", "into", "is", "join", "key", "left", "like",
        "limit", "merge", "not", "null", "offset", "on", "or", "order", "outer", "primary",
        "procedure", "references", "revoke", "right", "rollback", "select", "set", "table",
        "then", "to", "top", "trigger", "true", "truncate", "union", "unique", "update",
        "user", "using", "values", "view", "when", "where", "with",
    ]
    .into_iter()
    .collect()
});

/// Validated table or column name (`^[A-Za-z_][A-Za-z0-9_]{0,63}$`, not a
/// reserved word).
///
/// Syntactic validity only. Whether the identifier is an intended target is
/// decided by `infrastructure::persistence::SqlIdentifierGuard`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    pub fn new(value: &str) -> Result<Self, SanitizeError> {
        if !IDENTIFIER_REGEX.is_match(value) {
            return Err(SanitizeError::InvalidFormat {
                expected: "a letter or underscore followed by up to 63 letters, digits or underscores",
            });
        }

        if Self::is_reserved(value) {
            return Err(SanitizeError::Rejected {
                reason: "reserved SQL keyword",
            });
        }

        Ok(Self(value.to_string()))
    }

    pub fn is_reserved(value: &str) -> bool {
        RESERVED_WORDS.contains(value.to_lowercase().as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Double-quoted form for splicing into statement text
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SqlIdentifier {
    type Err = SanitizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SqlIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
