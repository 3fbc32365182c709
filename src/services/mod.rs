//! Services layer - Business logic
//!
//! This module contains the business logic of the bloglist service.
//! Services are responsible for:
//! - Implementing the blog and account rules
//! - Coordinating repositories with the password and token capabilities
//! - Handling validation and error cases

pub mod blog;
pub mod credentials;
pub mod password;
pub mod stats;
pub mod token;
pub mod user;

pub use blog::{BlogService, BlogServiceError};
pub use credentials::{CredentialError, CredentialVerifier};
pub use password::{Argon2Hasher, DynPasswordHasher, PasswordHasher};
pub use stats::{BlogStats, StatsError};
pub use token::{Claims, JwtSigner, TokenError, TokenService, TokenSigner};
pub use user::{RegisterInput, UserService, UserServiceError};
