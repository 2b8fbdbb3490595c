use serde::{Deserialize, Serialize};

/// Closed set of field kinds; each selects a base rule and a sanitizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free single-line text
    Text,
    /// Person or company name
    Name,
    /// Short business code (SKU, department code, ...)
    Code,
    /// Multi-line free text
    Description,
    Integer,
    Decimal,
    Currency,
    Percentage,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Email,
    Phone,
    Url,
    Password,
    Filename,
    SqlIdentifier,
    Boolean,
    /// Upper-cased state code (ACTIVE, SUSPENDED, ...)
    Status,
    /// Fallback for keys and type names the schema does not know
    Generic,
}

impl FieldType {
    pub const ALL: [FieldType; 19] = [
        FieldType::Text,
        FieldType::Name,
        FieldType::Code,
        FieldType::Description,
        FieldType::Integer,
        FieldType::Decimal,
        FieldType::Currency,
        FieldType::Percentage,
        FieldType::Date,
        FieldType::DateTime,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Url,
        FieldType::Password,
        FieldType::Filename,
        FieldType::SqlIdentifier,
        FieldType::Boolean,
        FieldType::Status,
        FieldType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Name => "name",
            FieldType::Code => "code",
            FieldType::Description => "description",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Password => "password",
            FieldType::Filename => "filename",
            FieldType::SqlIdentifier => "sql_identifier",
            FieldType::Boolean => "boolean",
            FieldType::Status => "status",
            FieldType::Generic => "generic",
        }
    }

    /// Parse a type name read from configuration, falling back to
    /// [`FieldType::Generic`] for names this build does not know.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(type_name = %name, "Unknown field type, using generic sanitizer");
            FieldType::Generic
        })
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Invalid field type: {}", s))
    }
}
