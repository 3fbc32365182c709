//! Password hashing
//!
//! `PasswordHasher` is the opaque capability the credential verifier and the
//! registration service depend on. `Argon2Hasher` implements it with
//! Argon2id, a random salt per hash and PHC string output.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2,
};
use std::sync::Arc;

/// One-way password hashing capability
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored
    /// hash cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Shared hasher handle
pub type DynPasswordHasher = Arc<dyn PasswordHasher>;

/// Argon2id hasher using the argon2 crate's default parameters
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared handle for dependency injection
    pub fn shared() -> DynPasswordHasher {
        Arc::new(Self::new())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;

        Ok(password_hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| anyhow!("Invalid password hash format: {}", e))
            .context("Failed to parse password hash")?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification failed: {}", e)),
        }
    }
}
