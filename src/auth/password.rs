//! Argon2id password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use thiserror::Error;

const TRACING_TARGET_PASSWORD: &str = "msaada_backend::auth::password";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password does not match")]
    Mismatch,

    #[error("Stored password hash is malformed: {0}")]
    InvalidHash(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Hashes and verifies passwords as PHC strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Argon2id with the crate's default parameters.
    fn argon2(&self) -> Argon2<'static> {
        Argon2::default()
    }

    /// Hashes with a fresh random salt; the result embeds algorithm, parameters and salt.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_PASSWORD,
                    error = %e,
                    "password hashing operation failed"
                );
                PasswordError::Hashing(e.to_string())
            })?;

        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_PASSWORD,
                error = %e,
                "invalid password hash format in storage"
            );
            PasswordError::InvalidHash(e.to_string())
        })?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(HashError::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Hashing(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            hasher.verify_password("wrong horse", &hash),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash_password("secret").unwrap();
        let b = hasher.hash_password("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_reported() {
        let hasher = PasswordHasher::new();
        assert!(matches!(
            hasher.verify_password("secret", "plaintext"),
            Err(PasswordError::InvalidHash(_))
        ));
    }
}
