//! Database layer
//!
//! This module provides database abstraction for the bloglist service.
//! It supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for larger deployments)
//!
//! The database driver is selected based on configuration.
//!
//! # Architecture
//!
//! The `DatabasePool` trait lets the repositories work with either SQLite or
//! MySQL without the services knowing the backend. Services only see the
//! `Repository` traits in [`repositories`].
//!
//! # Usage
//!
//! ```ignore
//! use bloglist::config::DatabaseConfig;
//! use bloglist::db::{create_pool, migrations};
//!
//! let config = DatabaseConfig::default();
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
