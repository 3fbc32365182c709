//! Blog repository
//!
//! Database operations for blog records.
//!
//! `SqlxBlogRepository` implements `Repository<Blog>` for SQLite and MySQL.
//! Records are listed in insertion order.

use crate::config::DatabaseDriver;
use crate::db::repositories::{new_record_id, Repository};
use crate::db::DynDatabasePool;
use crate::models::Blog;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// SQLx-based blog repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    /// Create a new SQLx blog repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn Repository<Blog>> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl Repository<Blog> for SqlxBlogRepository {
    async fn get(&self, id: &str) -> Result<Option<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_blog_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => get_blog_mysql(self.pool.require_mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_blogs_sqlite(self.pool.require_sqlite()?).await,
            DatabaseDriver::Mysql => list_blogs_mysql(self.pool.require_mysql()?).await,
        }
    }

    async fn insert(&self, blog: &Blog) -> Result<String> {
        let id = new_record_id();
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                insert_blog_sqlite(self.pool.require_sqlite()?, &id, blog).await?
            }
            DatabaseDriver::Mysql => insert_blog_mysql(self.pool.require_mysql()?, &id, blog).await?,
        }
        Ok(id)
    }

    async fn update(&self, id: &str, blog: &Blog) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_blog_sqlite(self.pool.require_sqlite()?, id, blog).await
            }
            DatabaseDriver::Mysql => update_blog_mysql(self.pool.require_mysql()?, id, blog).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_blog_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_blog_mysql(self.pool.require_mysql()?, id).await,
        }
    }
}

/// Likes are stored as a signed 64-bit column
fn likes_to_db(likes: u64) -> Result<i64> {
    i64::try_from(likes).context("Like count does not fit the likes column")
}

fn likes_from_db(likes: i64) -> Result<u64> {
    u64::try_from(likes).context("Stored like count is negative")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn insert_blog_sqlite(pool: &SqlitePool, id: &str, blog: &Blog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blogs (id, title, author, url, likes, creator_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&blog.title)
    .bind(&blog.author)
    .bind(&blog.url)
    .bind(likes_to_db(blog.likes)?)
    .bind(&blog.creator)
    .execute(pool)
    .await
    .context("Failed to create blog")?;

    Ok(())
}

async fn get_blog_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Blog>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, author, url, likes, creator_id
        FROM blogs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get blog by ID")?;

    row.map(|row| row_to_blog_sqlite(&row)).transpose()
}

async fn list_blogs_sqlite(pool: &SqlitePool) -> Result<Vec<Blog>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, author, url, likes, creator_id
        FROM blogs
        ORDER BY rowid
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list blogs")?;

    rows.iter().map(row_to_blog_sqlite).collect()
}

async fn update_blog_sqlite(pool: &SqlitePool, id: &str, blog: &Blog) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE blogs
        SET title = ?, author = ?, url = ?, likes = ?, creator_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&blog.title)
    .bind(&blog.author)
    .bind(&blog.url)
    .bind(likes_to_db(blog.likes)?)
    .bind(&blog.creator)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update blog")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_blog_sqlite(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete blog")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_blog_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Blog> {
    Ok(Blog {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        url: row.get("url"),
        likes: likes_from_db(row.get("likes"))?,
        creator: row.get("creator_id"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn insert_blog_mysql(pool: &MySqlPool, id: &str, blog: &Blog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blogs (id, title, author, url, likes, creator_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&blog.title)
    .bind(&blog.author)
    .bind(&blog.url)
    .bind(likes_to_db(blog.likes)?)
    .bind(&blog.creator)
    .execute(pool)
    .await
    .context("Failed to create blog")?;

    Ok(())
}

async fn get_blog_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Blog>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, author, url, likes, creator_id
        FROM blogs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get blog by ID")?;

    row.map(|row| row_to_blog_mysql(&row)).transpose()
}

async fn list_blogs_mysql(pool: &MySqlPool) -> Result<Vec<Blog>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, author, url, likes, creator_id
        FROM blogs
        ORDER BY seq
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list blogs")?;

    rows.iter().map(row_to_blog_mysql).collect()
}

async fn update_blog_mysql(pool: &MySqlPool, id: &str, blog: &Blog) -> Result<bool> {
    // MySQL reports zero affected rows when nothing changed, so existence is checked separately
    let exists = sqlx::query("SELECT 1 FROM blogs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to check blog existence")?
        .is_some();
    if !exists {
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE blogs
        SET title = ?, author = ?, url = ?, likes = ?, creator_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&blog.title)
    .bind(&blog.author)
    .bind(&blog.url)
    .bind(likes_to_db(blog.likes)?)
    .bind(&blog.creator)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update blog")?;

    Ok(true)
}

async fn delete_blog_mysql(pool: &MySqlPool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete blog")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_blog_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Blog> {
    Ok(Blog {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        url: row.get("url"),
        likes: likes_from_db(row.get("likes"))?,
        creator: row.get("creator_id"),
    })
}
