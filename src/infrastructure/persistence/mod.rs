//! Guards for statement text built at runtime

mod identifier_guard;
mod query_template;

pub use identifier_guard::SqlIdentifierGuard;
pub use query_template::{PreparedQuery, SafeQueryTemplate};
