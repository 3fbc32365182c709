//! Data models
//!
//! This module contains the data structures shared by the bloglist service:
//! - Database entities (Blog, User)
//! - API input types
//! - The authenticated `Identity`

mod blog;
mod user;

pub use blog::{Blog, CreateBlogInput, UpdateBlogInput};
pub use user::{Identity, User};
