//! User API endpoints
//!
//! - POST /api/users - Register an account
//! - GET /api/users - List accounts

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState, JsonBody};
use crate::models::User;
use crate::services::RegisterInput;

/// Build the users router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_users).post(register))
}

/// GET /api/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.user_service.list().await?;
    Ok(Json(users))
}

/// POST /api/users
///
/// The password hash is never part of the response.
async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterInput>,
) -> Result<Json<User>, ApiError> {
    let user = state.user_service.register(body).await?;
    Ok(Json(user))
}
