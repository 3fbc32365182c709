//! User service
//!
//! Implements account registration and listing.
//!
//! Usernames are unique and case-sensitive. Username and password lengths
//! are counted in characters, not bytes.

use crate::db::repositories::{Repository, UserRepository};
use crate::models::User;
use crate::services::password::DynPasswordHasher;
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

/// Minimum length of usernames and passwords, in characters
pub const MIN_CREDENTIAL_LENGTH: usize = 3;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error (short credentials, duplicate username)
    #[error("{0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Registration input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterInput {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            password: password.into(),
        }
    }
}

/// User service for managing accounts
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    hasher: DynPasswordHasher,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, hasher: DynPasswordHasher) -> Self {
        Self { user_repo, hasher }
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username or password is shorter than 3 characters
    /// - `ValidationError` if the username is already taken
    /// - `InternalError` for database or hashing errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(duplicate_username());
        }

        let password_hash = self
            .hasher
            .hash(&input.password)
            .context("Failed to hash password")?;

        let mut user = User::new(input.username, input.name, password_hash);

        // A concurrent registration can still win the race to the unique index
        user.id = match self.user_repo.insert(&user).await {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => return Err(duplicate_username()),
            Err(e) => return Err(e.context("Failed to create user").into()),
        };

        tracing::info!("Registered user {}", user.username);
        Ok(user)
    }

    /// List all users in registration order
    pub async fn list(&self) -> Result<Vec<User>, UserServiceError> {
        let users = self.user_repo.list().await.context("Failed to list users")?;
        Ok(users)
    }
}

fn validate_register_input(input: &RegisterInput) -> Result<(), UserServiceError> {
    if input.username.chars().count() < MIN_CREDENTIAL_LENGTH
        || input.password.chars().count() < MIN_CREDENTIAL_LENGTH
    {
        return Err(UserServiceError::ValidationError(
            "both username and password must be at least 3 characters long".to_string(),
        ));
    }

    Ok(())
}

fn duplicate_username() -> UserServiceError {
    UserServiceError::ValidationError("expected `username` to be unique".to_string())
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| db.is_unique_violation())
    })
}
