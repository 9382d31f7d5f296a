//! # Database Migrations
//!
//! Embedded SQL migrations, one set per store.
//!
//! ```text
//! migrations/
//! ├── relational/
//! │   └── 0001_initial_schema.sql   users, products, inventory
//! └── documents/
//!     └── 1001_documents.sql        orders, sales
//! ```
//!
//! Version numbers never overlap between the two sets, so both stores may
//! point at the same SQLite file. Each migrator ignores versions that belong
//! to the other set.
//!
//! ## Adding New Migrations
//!
//! 1. Add a file to the right directory with the next version number
//! 2. Keep relational versions below 1000 and document versions above
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Which migration set to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Relational,
    Documents,
}

impl Schema {
    fn migrator(&self) -> Migrator {
        let mut migrator = match self {
            Schema::Relational => sqlx::migrate!("../../migrations/relational"),
            Schema::Documents => sqlx::migrate!("../../migrations/documents"),
        };
        migrator.set_ignore_missing(true);
        migrator
    }

    fn label(&self) -> &'static str {
        match self {
            Schema::Relational => "relational",
            Schema::Documents => "documents",
        }
    }
}

/// Runs all pending migrations of `schema`.
///
/// Idempotent: safe to run on every startup.
pub async fn run_migrations(pool: &SqlitePool, schema: Schema) -> DbResult<()> {
    info!(schema = schema.label(), "Checking for pending migrations");

    schema.migrator().run(pool).await?;

    info!(schema = schema.label(), "All migrations applied successfully");
    Ok(())
}

/// Returns (total_migrations, applied_migrations) for `schema`.
pub async fn migration_status(pool: &SqlitePool, schema: Schema) -> DbResult<(usize, usize)> {
    let migrator = schema.migrator();
    let total = migrator.migrations.len();

    let versions: Vec<i64> = migrator.iter().map(|m| m.version).collect();
    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM _sqlx_migrations")
        .fetch_all(pool)
        .await?;

    let applied = applied.iter().filter(|v| versions.contains(v)).count();
    Ok((total, applied))
}
