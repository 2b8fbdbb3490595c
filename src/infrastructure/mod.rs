pub mod crypto;
pub mod persistence;
pub mod storage;

pub use crypto::PasswordHasher;
pub use persistence::{PreparedQuery, SafeQueryTemplate, SqlIdentifierGuard};
pub use storage::{resolve_within_base, PathGuard};
