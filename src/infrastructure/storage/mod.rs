mod path_guard;

pub use path_guard::{resolve_within_base, PathGuard};
