//! # Database Connection Pool Module
//!
//! SQLite connection pooling for the course catalog cache.
//!
//! ## Features
//!
//! - **WAL Mode**: file databases allow readers alongside the single writer
//! - **Connection Pooling**: configurable min/max connections with timeouts
//! - **Statement Caching**: prepared statements are cached per connection
//! - **Automatic Migrations**: embedded with `sqlx::migrate!` and run on open
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_catalog::db::{create_pool, DatabaseConfig};
//!
//! let pool = create_pool(DatabaseConfig::new("academy.db")).await?;
//! ```
//!
//! Tests use [`create_test_pool`], a private in-memory database with the
//! schema applied.

use crate::error::{CatalogError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Database configuration for the SQLite connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `sqlite:` URL of the database
    pub database_url: String,

    /// Whether the database lives only in memory
    pub in_memory: bool,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Maximum time to wait for a connection from the pool
    pub acquire_timeout: Duration,

    /// Maximum idle time for a connection before being closed
    pub idle_timeout: Option<Duration>,

    /// Number of prepared statements cached per connection
    pub statement_cache_capacity: usize,
}

impl DatabaseConfig {
    /// Configuration for a database file, created if missing.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        let path = database_path.into();

        Self {
            database_url: format!("sqlite:{}", path.display()),
            in_memory: false,
            min_connections: 1,
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            statement_cache_capacity: 64,
        }
    }

    /// Configuration for a private in-memory database.
    ///
    /// The pool keeps exactly one connection open for its whole life; closing
    /// it would discard the data.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            in_memory: true,
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: None,
            statement_cache_capacity: 64,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Open the pool, apply migrations and check that the database answers.
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool> {
    info!(
        database_url = %config.database_url,
        max_connections = config.max_connections,
        "Opening catalog database"
    );

    let mut connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true)
        .statement_cache_capacity(config.statement_cache_capacity);

    if !config.in_memory {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let max_connections = if config.in_memory {
        1
    } else {
        config.max_connections.max(1)
    };

    let pool = SqlitePoolOptions::new()
        .min_connections(config.min_connections.min(max_connections))
        .max_connections(max_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(if config.in_memory {
            None
        } else {
            config.idle_timeout
        })
        .max_lifetime(None)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to open catalog database");
            CatalogError::Database(e)
        })?;

    run_migrations(&pool).await?;
    health_check(&pool).await?;

    Ok(pool)
}

/// In-memory pool with the schema applied.
pub async fn create_test_pool() -> Result<SqlitePool> {
    create_pool(DatabaseConfig::in_memory()).await
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    debug!("Running catalog migrations");

    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        CatalogError::Migration(e.to_string())
    })?;

    Ok(())
}

async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| {
        warn!(error = %e, "Database health check failed");
        CatalogError::Database(e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_pool() {
        let pool = create_test_pool().await;
        assert!(pool.is_ok(), "Should create test pool successfully");
    }

    #[tokio::test]
    async fn test_schema_applied() {
        let pool = create_test_pool().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('courses', 'modules') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<_> = tables.into_iter().map(|(name,)| name).collect();
        assert_eq!(names, vec!["courses".to_string(), "modules".to_string()]);
    }

    #[tokio::test]
    async fn test_test_pools_are_isolated() {
        let first = create_test_pool().await.unwrap();
        let second = create_test_pool().await.unwrap();

        sqlx::query("INSERT INTO courses (id, title) VALUES ('c1', 'Algorithms')")
            .execute(&first)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
            .fetch_one(&second)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_database_config_builder() {
        let config = DatabaseConfig::new("academy.db")
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(5))
            .statement_cache_capacity(16);

        assert_eq!(config.database_url, "sqlite:academy.db");
        assert!(!config.in_memory);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.statement_cache_capacity, 16);
    }

    #[test]
    fn test_in_memory_uses_single_connection() {
        let config = DatabaseConfig::default();
        assert!(config.in_memory);
        assert_eq!(config.max_connections, 1);
        assert!(config.idle_timeout.is_none());
    }
}
