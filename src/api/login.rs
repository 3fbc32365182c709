//! Login API endpoint
//!
//! - POST /api/login - Exchange username and password for a bearer token

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, JsonBody};

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response for successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub name: String,
}

/// Build the login router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(login))
}

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identity = state
        .credential_verifier
        .verify(&body.username, &body.password)
        .await?;

    let token = state.token_service.issue(&identity)?;
    tracing::info!("User {} logged in", identity.username);

    Ok(Json(LoginResponse {
        token,
        username: identity.username,
        name: identity.name,
    }))
}
