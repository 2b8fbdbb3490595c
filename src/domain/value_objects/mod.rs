mod field_type;
mod field_value;
mod sql_identifier;
mod threat;

pub use field_type::FieldType;
pub use field_value::{FieldValue, DATETIME_FORMAT, DATE_FORMAT};
pub use sql_identifier::SqlIdentifier;
pub use threat::{ThreatCategory, ThreatMatch};
