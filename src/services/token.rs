//! Token service
//!
//! Issues and verifies the bearer tokens presented on blog mutations.
//!
//! Signing is behind the `TokenSigner` capability; `JwtSigner` implements it
//! with HS256 JWTs. Tokens are bound to one user id (the `sub` claim), are
//! never persisted and expire only when a lifetime is configured.

use crate::models::Identity;
use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error types for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// No token was presented
    #[error("token missing")]
    Missing,

    /// Token is malformed, badly signed or expired. Carries the reason for logging.
    #[error("token invalid")]
    Invalid(String),

    /// Token could not be signed
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub username: String,
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp), absent for non-expiring tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl Claims {
    /// Build claims for an identity, valid for `ttl_seconds` when given
    pub fn for_identity(identity: &Identity, issued_at: u64, ttl_seconds: Option<u64>) -> Self {
        Self {
            sub: identity.id.clone(),
            username: identity.username.clone(),
            name: identity.name.clone(),
            iat: issued_at,
            exp: ttl_seconds.map(|ttl| issued_at.saturating_add(ttl)),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
        }
    }
}

/// Token signing capability
pub trait TokenSigner: Send + Sync {
    /// Sign claims into an opaque token string
    fn sign(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Check a token's signature and expiry, returning its claims
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JWT signer
#[derive(Clone)]
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is optional; it is still checked whenever present
        validation.set_required_spec_claims(&["sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        use jsonwebtoken::errors::ErrorKind;

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                let reason = match err.kind() {
                    ErrorKind::ExpiredSignature => "expired".to_string(),
                    ErrorKind::InvalidSignature => "bad signature".to_string(),
                    ErrorKind::InvalidToken => "malformed".to_string(),
                    other => format!("{:?}", other),
                };
                TokenError::Invalid(reason)
            })
    }
}

/// Token service issuing and verifying bearer tokens
#[derive(Clone)]
pub struct TokenService {
    signer: Arc<dyn TokenSigner>,
    ttl_seconds: Option<u64>,
}

impl TokenService {
    /// Create a token service; tokens never expire when `ttl_seconds` is `None`
    pub fn new(signer: Arc<dyn TokenSigner>, ttl_seconds: Option<u64>) -> Self {
        Self { signer, ttl_seconds }
    }

    /// Create a token service backed by an HS256 signer
    pub fn with_secret(secret: &str, ttl_seconds: Option<u64>) -> Self {
        Self::new(Arc::new(JwtSigner::new(secret)), ttl_seconds)
    }

    /// Issue a token bound to the given identity
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let claims = Claims::for_identity(identity, get_current_timestamp(), self.ttl_seconds);
        self.signer.sign(&claims)
    }

    /// Verify a presented token
    ///
    /// # Errors
    ///
    /// - `Missing` if no token was presented
    /// - `Invalid` if the token is malformed, badly signed or expired
    pub fn verify(&self, token: Option<&str>) -> Result<Identity, TokenError> {
        let token = token.ok_or(TokenError::Missing)?;
        let claims = self.signer.verify(token)?;
        Ok(claims.identity())
    }
}
