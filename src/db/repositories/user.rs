//! User repository
//!
//! Database operations for user accounts.
//!
//! This module provides:
//! - `UserRepository` trait extending `Repository<User>` with username lookup
//! - `SqlxUserRepository` implementing it for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::repositories::{new_record_id, Repository};
use crate::db::DynDatabasePool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Repository<User> {
    /// Get user by username (exact, case-sensitive match)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl Repository<User> for SqlxUserRepository {
    async fn get(&self, id: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_id_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => get_user_by_id_mysql(self.pool.require_mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_users_sqlite(self.pool.require_sqlite()?).await,
            DatabaseDriver::Mysql => list_users_mysql(self.pool.require_mysql()?).await,
        }
    }

    async fn insert(&self, user: &User) -> Result<String> {
        let id = new_record_id();
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_user_sqlite(self.pool.require_sqlite()?, &id, user).await?
            }
            DatabaseDriver::Mysql => create_user_mysql(self.pool.require_mysql()?, &id, user).await?,
        }
        Ok(id)
    }

    async fn update(&self, id: &str, user: &User) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_user_sqlite(self.pool.require_sqlite()?, id, user).await
            }
            DatabaseDriver::Mysql => update_user_mysql(self.pool.require_mysql()?, id, user).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_user_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_user_mysql(self.pool.require_mysql()?, id).await,
        }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_username_sqlite(self.pool.require_sqlite()?, username).await
            }
            DatabaseDriver::Mysql => {
                get_user_by_username_mysql(self.pool.require_mysql()?, username).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, id: &str, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, name, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&user.username)
    .bind(&user.name)
    .bind(&user.password_hash)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(())
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, name, password_hash
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by ID")?;

    Ok(row.as_ref().map(row_to_user_sqlite))
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, name, password_hash
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    Ok(row.as_ref().map(row_to_user_sqlite))
}

async fn list_users_sqlite(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, username, name, password_hash
        FROM users
        ORDER BY rowid
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    Ok(rows.iter().map(row_to_user_sqlite).collect())
}

async fn update_user_sqlite(pool: &SqlitePool, id: &str, user: &User) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET username = ?, name = ?, password_hash = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.name)
    .bind(&user.password_hash)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_user_sqlite(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, id: &str, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, name, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&user.username)
    .bind(&user.name)
    .bind(&user.password_hash)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(())
}

async fn get_user_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, name, password_hash
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by ID")?;

    Ok(row.as_ref().map(row_to_user_mysql))
}

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, name, password_hash
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    Ok(row.as_ref().map(row_to_user_mysql))
}

async fn list_users_mysql(pool: &MySqlPool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, username, name, password_hash
        FROM users
        ORDER BY seq
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    Ok(rows.iter().map(row_to_user_mysql).collect())
}

async fn update_user_mysql(pool: &MySqlPool, id: &str, user: &User) -> Result<bool> {
    // Affected-row counts exclude unchanged rows on MySQL
    if get_user_by_id_mysql(pool, id).await?.is_none() {
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, name = ?, password_hash = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.name)
    .bind(&user.password_hash)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    Ok(true)
}

async fn delete_user_mysql(pool: &MySqlPool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
    }
}
