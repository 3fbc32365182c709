//! User model
//!
//! This module defines the User entity and the authenticated `Identity`
//! derived from it.

use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Username (unique, case-sensitive)
    pub username: String,
    /// Display name
    pub name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    pub fn new(username: String, name: String, password_hash: String) -> Self {
        Self {
            id: String::new(), // Will be set by the store
            username,
            name,
            password_hash,
        }
    }

    /// The identity this account authenticates as
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
        }
    }
}

/// Authenticated user context produced by credential or token verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("root".to_string(), "Superuser".to_string(), "hashed".to_string());

        assert!(user.id.is_empty());
        assert_eq!(user.username, "root");
        assert_eq!(user.name, "Superuser");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let mut user = User::new("root".to_string(), "Superuser".to_string(), "$argon2id$secret".to_string());
        user.id = "u1".to_string();

        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("password"));
        assert!(!json.contains("$argon2id$secret"));
        assert!(json.contains("\"id\":\"u1\""));
    }

    #[test]
    fn test_identity_from_user() {
        let mut user = User::new("mluukkai".to_string(), "Matti Luukkainen".to_string(), "h".to_string());
        user.id = "u7".to_string();

        let identity = user.identity();

        assert_eq!(identity.id, "u7");
        assert_eq!(identity.username, "mluukkai");
        assert_eq!(identity.name, "Matti Luukkainen");
    }
}
