//! Password hashing and verification using Argon2id.
//!
//! Hashes are produced in PHC string format (`$argon2id$v=19$...`), so the
//! algorithm parameters and the salt travel with the hash and can be stored
//! as a single opaque column.

use std::sync::Arc;

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::Rng;

use crate::utility::tracing_targets::TRACING_TARGET_PASSWORD_HASHER as TRACING_TARGET;
use crate::{Error, Result};

/// Number of random bytes in each salt.
const SALT_LENGTH: usize = 16;

/// Argon2id password hashing and verification service.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a random password, verified against for unknown accounts.
    dummy_hash: Option<Arc<str>>,
}

impl PasswordHasher {
    /// Creates a new instance of the [`PasswordHasher`] service.
    ///
    /// Hashes one random password up front so that
    /// [`verify_dummy_password`] costs a single verification.
    ///
    /// [`verify_dummy_password`]: Self::verify_dummy_password
    pub fn new() -> Self {
        let mut hasher = Self {
            argon2: Argon2::default(),
            dummy_hash: None,
        };

        let password_len = rand::random_range(16..32);
        let dummy_password: String = (0..password_len)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();

        // Failure is already logged by `hash_password`.
        hasher.dummy_hash = hasher.hash_password(&dummy_password).ok().map(Arc::from);
        hasher
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// There is no length limit on `password`; Argon2 accepts arbitrary input.
    ///
    /// # Errors
    ///
    /// Returns an internal error if salt encoding or hashing fails.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_LENGTH];
        rand::rng().fill(&mut salt_bytes);

        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to encode password salt"
            );
            Error::internal("Password processing failed").with_source(e)
        })?;

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );
                Error::internal("Password processing failed").with_source(e)
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a plaintext password against a stored PHC hash.
    ///
    /// A stored hash that cannot be parsed is a verification failure, not an
    /// error: it is logged and `false` is returned.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(parsed_hash) => parsed_hash,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "stored password hash is malformed"
                );
                return false;
            }
        };

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => {
                tracing::debug!(target: TRACING_TARGET, "password verification succeeded");
                true
            }
            Err(ArgonError::Password) => {
                tracing::debug!(target: TRACING_TARGET, "password verification failed");
                false
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );
                false
            }
        }
    }

    /// Verifies `password` against the precomputed dummy hash.
    ///
    /// Called when the login email is unknown so that the response costs
    /// one Argon2 verification, the same as a wrong password for a real
    /// account. Always returns `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        if let Some(dummy_hash) = &self.dummy_hash {
            let _ = self.verify_password(password, dummy_hash);
        }

        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
