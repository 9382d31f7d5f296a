//! # Database Pool Management
//!
//! Connection pools for the two stores.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Handles                                      │
//! │                                                                         │
//! │  main()                                                                 │
//! │    │                                                                    │
//! │    ├─► Database::new(DbConfig::new("store.db"))                         │
//! │    │     └─ SqlitePool ─► users(), products(), inventory()              │
//! │    │                                                                    │
//! │    └─► DocumentStore::new(DbConfig::new("documents.db"))                │
//! │          └─ SqlitePool ─► orders(), sales()                             │
//! │                                                                         │
//! │  Both handles are cheap to clone and are injected into AppState.       │
//! │  Nothing opens a connection on its own.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so readers don't block
//! writers and writers don't block readers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, Schema};
use crate::repository::inventory::InventoryRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./data/store.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Every pool built from this config gets its own private database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }
}

/// Builds a configured SQLite pool.
async fn connect(config: &DbConfig) -> DbResult<SqlitePool> {
    info!(
        path = %config.database_path.display(),
        "Initializing database connection"
    );

    let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

    let connect_options = SqliteConnectOptions::from_str(&connect_url)
        .map_err(|e| DbError::Connection(e.to_string()))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        // SQLite has them disabled by default; inventory cascades need them
        .foreign_keys(true)
        .create_if_missing(true);

    debug!("Connection options configured");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .connect_with(connect_options)
        .await
        .map_err(|e| DbError::Connection(e.to_string()))?;

    info!(
        max_connections = config.max_connections,
        "Database pool created"
    );

    Ok(pool)
}

async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

// =============================================================================
// Relational Store
// =============================================================================

/// Handle to the relational store: users, products and inventory.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./store.db")).await?;
/// let product = db.products().get_by_id(1).await?;
/// let stock = db.inventory().get_by_product(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates the pool and, if enabled, applies the relational migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let pool = connect(&config).await?;
        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool, Schema::Relational).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone())
    }

    /// Closes the connection pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing relational store pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        ping(&self.pool).await
    }
}

// =============================================================================
// Document Store
// =============================================================================

/// Handle to the document store: orders and sales.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Creates the pool and, if enabled, applies the document migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let pool = connect(&config).await?;
        let store = DocumentStore { pool };

        if config.run_migrations {
            store.run_migrations().await?;
        }

        Ok(store)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool, Schema::Documents).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        info!("Closing document store pool");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        ping(&self.pool).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_stores() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let docs = DocumentStore::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert!(docs.health_check().await);
    }

    #[tokio::test]
    async fn test_migration_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migrations::migration_status(db.pool(), Schema::Relational)
            .await
            .unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_both_schemas_share_one_pool() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // Running the document set on the relational pool must not trip
        // over the relational versions already recorded.
        migrations::run_migrations(db.pool(), Schema::Documents)
            .await
            .unwrap();
        db.run_migrations().await.unwrap();
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
    }
}
