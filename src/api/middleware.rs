//! API middleware
//!
//! Contains the request plumbing shared by all handlers:
//! - `AppState` holding the services
//! - `ApiError` mapping service failures to JSON responses
//! - `BearerToken` extracting the bearer credential from `Authorization`
//! - `JsonBody` parsing request bodies with `ApiError` rejections

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::repositories::{SqlxBlogRepository, SqlxUserRepository};
use crate::db::DynDatabasePool;
use crate::services::{
    Argon2Hasher, BlogService, BlogServiceError, CredentialError, CredentialVerifier,
    TokenError, TokenService, UserService, UserServiceError,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub blog_service: Arc<BlogService>,
    pub user_service: Arc<UserService>,
    pub credential_verifier: Arc<CredentialVerifier>,
    pub token_service: TokenService,
}

impl AppState {
    /// Wire the services over a migrated database pool
    pub fn build(pool: DynDatabasePool, auth: &AuthConfig) -> Self {
        let hasher = Argon2Hasher::shared();
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let token_service = TokenService::with_secret(&auth.secret, auth.token_ttl_seconds);

        Self {
            blog_service: Arc::new(BlogService::with_ownership(
                SqlxBlogRepository::boxed(pool),
                token_service.clone(),
                auth.ownership,
            )),
            user_service: Arc::new(UserService::new(user_repo.clone(), hasher.clone())),
            credential_verifier: Arc::new(CredentialVerifier::new(user_repo, hasher)),
            token_service,
        }
    }
}

/// Error response for API errors
///
/// Serialized as `{ "error": <message>, "code": <kind> }`; the HTTP status
/// is derived from `code`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }

    pub fn missing_token() -> Self {
        Self::new("MISSING_TOKEN", "token missing")
    }

    pub fn invalid_token() -> Self {
        Self::new("INVALID_TOKEN", "token invalid")
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new("INVALID_CREDENTIALS", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Log the cause and hide it from the client
    pub fn internal_error(cause: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", cause);
        Self::new("INTERNAL_ERROR", "internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "MISSING_TOKEN" | "INVALID_TOKEN" | "INVALID_CREDENTIALS" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(err: BlogServiceError) -> Self {
        match err {
            BlogServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            BlogServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            BlogServiceError::MissingToken => ApiError::missing_token(),
            BlogServiceError::InvalidToken => ApiError::invalid_token(),
            BlogServiceError::Forbidden => ApiError::forbidden(err.to_string()),
            BlogServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => ApiError::invalid_credentials(err.to_string()),
            CredentialError::Internal(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => ApiError::missing_token(),
            TokenError::Invalid(_) => ApiError::invalid_token(),
            TokenError::Signing(e) => ApiError::internal_error(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation_error(rejection.body_text())
    }
}

/// JSON request body.
///
/// Same as `Json`, except that a missing content type or an undecodable body
/// is rejected with a `VALIDATION_ERROR` body instead of plain text.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// Bearer token presented in the `Authorization` header, if any.
///
/// Never rejects: whether a token is required is decided by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(extract_bearer_token(&parts.headers)))
    }
}

/// Extract the token from `Authorization: bearer <token>`.
///
/// The scheme name is matched case-insensitively. Empty tokens and other
/// schemes count as no token.
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token_lowercase_scheme() {
        let headers = headers_with_auth("bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_capitalized_scheme() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_absent() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extract_bearer_token_other_scheme() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_extract_bearer_token_empty() {
        assert_eq!(extract_bearer_token(&headers_with_auth("bearer ")), None);
        assert_eq!(extract_bearer_token(&headers_with_auth("bearer")), None);
    }

    #[tokio::test]
    async fn test_json_body_rejection_is_validation_error() {
        let request = axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"likes":"five"}"#))
            .unwrap();

        let err = JsonBody::<crate::models::CreateBlogInput>::from_request(request, &())
            .await
            .unwrap_err();

        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_body_requires_json_content_type() {
        let request = axum::http::Request::builder()
            .method("POST")
            .body(axum::body::Body::from("title=plain"))
            .unwrap();

        let err = JsonBody::<crate::models::CreateBlogInput>::from_request(request, &())
            .await
            .unwrap_err();

        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::validation_error("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::missing_token().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::invalid_token().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::invalid_credentials("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::internal_error("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_body_shape() {
        let body = serde_json::to_value(ApiError::missing_token()).unwrap();

        assert_eq!(body, serde_json::json!({ "error": "token missing", "code": "MISSING_TOKEN" }));
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let err = ApiError::from(BlogServiceError::InternalError(anyhow::anyhow!("disk on fire")));

        assert_eq!(err.code, "INTERNAL_ERROR");
        assert!(!err.error.contains("disk on fire"));
    }
}
