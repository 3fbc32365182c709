//! Blog API endpoints
//!
//! Handles HTTP requests for blog records:
//! - GET /api/blogs - List all blogs
//! - GET /api/blogs/stats - Like statistics over all blogs
//! - GET /api/blogs/{id} - Get one blog
//! - POST /api/blogs - Create a blog (bearer token)
//! - PUT /api/blogs/{id} - Update a blog
//! - DELETE /api/blogs/{id} - Delete a blog (bearer token)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, BearerToken, JsonBody};
use crate::models::{Blog, CreateBlogInput, UpdateBlogInput};
use crate::services::stats::{self, BlogStats};

/// Build the blogs router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/stats", get(blog_stats))
        .route("/{id}", get(get_blog).put(update_blog).delete(delete_blog))
}

/// GET /api/blogs
async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<Blog>>, ApiError> {
    let blogs = state.blog_service.list().await?;
    Ok(Json(blogs))
}

/// GET /api/blogs/stats
async fn blog_stats(State(state): State<AppState>) -> Result<Json<BlogStats>, ApiError> {
    let blogs = state.blog_service.list().await?;
    Ok(Json(stats::summarize(&blogs)))
}

/// GET /api/blogs/{id}
async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state.blog_service.get(&id).await?;
    Ok(Json(blog))
}

/// POST /api/blogs
///
/// A body that cannot be decoded is only reported once the token checks out.
async fn create_blog(
    State(state): State<AppState>,
    token: BearerToken,
    body: Result<JsonBody<CreateBlogInput>, ApiError>,
) -> Result<Json<Blog>, ApiError> {
    let body = match body {
        Ok(JsonBody(body)) => body,
        Err(rejection) => {
            state.token_service.verify(token.as_deref())?;
            return Err(rejection);
        }
    };

    let blog = state.blog_service.create(body, token.as_deref()).await?;
    Ok(Json(blog))
}

/// PUT /api/blogs/{id}
async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateBlogInput>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state.blog_service.update(&id, body).await?;
    Ok(Json(blog))
}

/// DELETE /api/blogs/{id}
async fn delete_blog(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.blog_service.delete(&id, token.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
