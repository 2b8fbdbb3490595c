mod password_hasher;

pub use password_hasher::{PasswordHasher, MIN_ITERATIONS, SALT_LENGTH};
