//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints of the bloglist service.
//! It includes:
//! - Blog endpoints (list, stats, get, create, update, delete)
//! - Login endpoint
//! - User endpoints (register, list)

pub mod blogs;
pub mod login;
pub mod middleware;
pub mod users;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, BearerToken, JsonBody};

/// Build the API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/blogs", blogs::router())
        .nest("/login", login::router())
        .nest("/users", users::router())
}

/// Build the complete router with middleware
///
/// `cors_origin` is either a single origin or `*` for any origin.
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let allow_origin = if cors_origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let origin = cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
        AllowOrigin::exact(origin)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(Router::new()
        .nest("/api", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
