//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Services depend only on the traits defined here, never on a specific
//! persistence engine.

pub mod blog;
pub mod user;

use anyhow::Result;
use async_trait::async_trait;

pub use blog::SqlxBlogRepository;
pub use user::{SqlxUserRepository, UserRepository};

/// Basic record store keyed by an opaque string id.
///
/// Single-record writes are atomic; concurrent writers resolve as
/// last-write-wins.
#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Get a record by ID
    async fn get(&self, id: &str) -> Result<Option<T>>;

    /// List all records in insertion order
    async fn list(&self) -> Result<Vec<T>>;

    /// Insert a record, returning the ID assigned by the store.
    /// Any ID already present on `item` is ignored.
    async fn insert(&self, item: &T) -> Result<String>;

    /// Replace the stored fields of a record. Returns false if no record has this ID.
    async fn update(&self, id: &str, item: &T) -> Result<bool>;

    /// Delete a record. Returns false if no record has this ID.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Generate a fresh record ID
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
