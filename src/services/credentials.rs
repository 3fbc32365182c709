//! Credential verifier
//!
//! Checks a username/password pair against the stored account during login.
//! An unknown username and a wrong password fail identically so that the
//! response never reveals which usernames exist.

use crate::db::repositories::UserRepository;
use crate::models::Identity;
use crate::services::password::DynPasswordHasher;
use anyhow::Context;
use std::sync::Arc;

/// Error types for credential verification
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Unknown username or wrong password
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Verifies login credentials
pub struct CredentialVerifier {
    user_repo: Arc<dyn UserRepository>,
    hasher: DynPasswordHasher,
}

impl CredentialVerifier {
    pub fn new(user_repo: Arc<dyn UserRepository>, hasher: DynPasswordHasher) -> Self {
        Self { user_repo, hasher }
    }

    /// Verify a username/password pair, returning the account's identity.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if the username is unknown or the password does not match
    /// - `Internal` for store or hash-format failures
    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, CredentialError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to look up user")?;

        let Some(user) = user else {
            tracing::debug!("Login rejected: unknown username");
            return Err(CredentialError::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify(password, &user.password_hash)
            .context("Failed to verify password")?;

        if !matches {
            tracing::debug!("Login rejected: password mismatch for user {}", user.id);
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(user.identity())
    }
}
