use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::GuardConfig;
use crate::domain::errors::PasswordError;
use crate::domain::rules::{RuleTable, ValidationRule};
use crate::domain::value_objects::FieldType;
use crate::security::sanitizers::check_password_policy;

/// Lowest PBKDF2 iteration count accepted for new or verified hashes
pub const MIN_ITERATIONS: u32 = 100_000;

pub const SALT_LENGTH: usize = 32;

const HASH_LENGTH: usize = 32;

/// PBKDF2-HMAC-SHA256 password hashing.
///
/// Stored form is `hex(salt):hex(derived_key)`. The iteration count is not
/// part of the stored string, so it must stay fixed for the lifetime of the
/// stored hashes.
///
/// Hashing is CPU-bound and blocks for the whole derivation. Async callers
/// use [`PasswordHasher::hash_password_async`], which runs it on the blocking
/// pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    iterations: u32,
    policy: Arc<ValidationRule>,
}

impl PasswordHasher {
    /// Uses the built-in password rule as policy
    pub fn new(iterations: u32) -> Result<Self, PasswordError> {
        if iterations < MIN_ITERATIONS {
            return Err(PasswordError::TooFewIterations(iterations));
        }
        Ok(Self {
            iterations,
            policy: Arc::new(builtin_policy()),
        })
    }

    pub fn from_config(config: &GuardConfig) -> Result<Self, PasswordError> {
        Self::new(config.password_iterations)
    }

    /// Enforce `rule` instead of the built-in password rule
    pub fn with_policy(mut self, rule: ValidationRule) -> Self {
        self.policy = Arc::new(rule);
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn policy(&self) -> &ValidationRule {
        &self.policy
    }

    /// Check the password policy, then derive with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        check_password_policy(password, &self.policy).map_err(PasswordError::Policy)?;

        let salt: [u8; SALT_LENGTH] = rand::random();
        let derived = self.derive(password, &salt);

        Ok(format!("{}:{}", hex::encode(salt), hex::encode(derived)))
    }

    /// `Ok(false)` for a wrong password, `Err` only for a malformed stored
    /// value. The comparison is constant-time.
    pub fn verify_password(&self, password: &str, stored: &str) -> Result<bool, PasswordError> {
        let (salt_hex, hash_hex) = stored.split_once(':').ok_or(PasswordError::MalformedHash)?;
        let salt = hex::decode(salt_hex).map_err(|_| PasswordError::MalformedHash)?;
        let expected = hex::decode(hash_hex).map_err(|_| PasswordError::MalformedHash)?;

        if salt.is_empty() || expected.len() != HASH_LENGTH {
            return Err(PasswordError::MalformedHash);
        }

        let derived = self.derive(password, &salt);
        Ok(derived[..].ct_eq(&expected[..]).into())
    }

    pub async fn hash_password_async(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    pub async fn verify_password_async(
        &self,
        password: String,
        stored: String,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &stored))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    fn derive(&self, password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
        let mut derived = [0u8; HASH_LENGTH];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut derived);
        derived
    }
}

fn builtin_policy() -> ValidationRule {
    RuleTable::global().rule_for(FieldType::Password).clone()
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: MIN_ITERATIONS,
            policy: Arc::new(builtin_policy()),
        }
    }
}
