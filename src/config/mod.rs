//! Configuration management
//!
//! This module handles loading and parsing configuration for the bloglist service.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signing secret used when none is configured. Only suitable for local development.
pub const DEV_AUTH_SECRET: &str = "bloglist-dev-secret-change-me-before-deploying";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/bloglist.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens
    #[serde(default = "default_auth_secret")]
    pub secret: String,
    /// Token lifetime in seconds. Tokens never expire when unset.
    #[serde(default)]
    pub token_ttl_seconds: Option<u64>,
    /// Who may delete a blog
    #[serde(default)]
    pub ownership: OwnershipPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_auth_secret(),
            token_ttl_seconds: None,
            ownership: OwnershipPolicy::default(),
        }
    }
}

impl AuthConfig {
    /// Whether the built-in development secret is still in use
    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_AUTH_SECRET
    }
}

fn default_auth_secret() -> String {
    DEV_AUTH_SECRET.to_string()
}

/// Ownership rule applied when a blog is deleted.
///
/// - Strict: only the creator may delete a blog that has one
/// - TokenOnly: any authenticated user may delete any blog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipPolicy {
    /// Creator must match the token identity (default)
    #[default]
    Strict,
    /// A valid token is sufficient
    TokenOnly,
}

impl fmt::Display for OwnershipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnershipPolicy::Strict => write!(f, "strict"),
            OwnershipPolicy::TokenOnly => write!(f, "token-only"),
        }
    }
}

impl FromStr for OwnershipPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(OwnershipPolicy::Strict),
            "token-only" | "token_only" => Ok(OwnershipPolicy::TokenOnly),
            _ => Err(ConfigError::ValidationError(format!(
                "unknown ownership policy: {}",
                s
            ))),
        }
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - BLOGLIST_SERVER_HOST
    /// - BLOGLIST_SERVER_PORT
    /// - BLOGLIST_SERVER_CORS_ORIGIN
    /// - BLOGLIST_DATABASE_DRIVER
    /// - BLOGLIST_DATABASE_URL
    /// - BLOGLIST_AUTH_SECRET
    /// - BLOGLIST_AUTH_TOKEN_TTL_SECONDS
    /// - BLOGLIST_AUTH_OWNERSHIP
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Ok(host) = std::env::var("BLOGLIST_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("BLOGLIST_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("BLOGLIST_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        // Database configuration
        if let Ok(driver) = std::env::var("BLOGLIST_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("BLOGLIST_DATABASE_URL") {
            self.database.url = url;
        }

        // Auth configuration
        if let Ok(secret) = std::env::var("BLOGLIST_AUTH_SECRET") {
            if !secret.is_empty() {
                self.auth.secret = secret;
            }
        }
        if let Ok(ttl) = std::env::var("BLOGLIST_AUTH_TOKEN_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.auth.token_ttl_seconds = Some(ttl);
            }
        }
        if let Ok(policy) = std::env::var("BLOGLIST_AUTH_OWNERSHIP") {
            if let Ok(policy) = policy.parse::<OwnershipPolicy>() {
                self.auth.ownership = policy;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
