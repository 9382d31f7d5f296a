//! # Storage Errors
//!
//! ```text
//! sqlx::Error ──────────┐
//! MigrateError ─────────┼──► DbError ──► AppError (store-api)
//! serde_json::Error ────┘
//! ```
//!
//! Only the constraint failures callers react to get their own variant.
//! Everything else keeps the driver message for the logs.

use sqlx::error::ErrorKind as SqlxErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write.
    ///
    /// ## When This Occurs
    /// - Duplicate user email
    /// - Duplicate product name
    /// - Second inventory record for a product
    /// - Second sale for the same order
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A row is still referenced, or points at a missing parent.
    ///
    /// ## When This Occurs
    /// - Product pointing at a missing user
    /// - Deleting a user that still owns products
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Cannot open store: {0}")]
    Connection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// A document body could not be encoded or decoded.
    #[error("Bad document body: {0}")]
    Document(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                // SQLite reports "UNIQUE constraint failed: <table>.<column>"
                SqlxErrorKind::UniqueViolation => DbError::UniqueViolation {
                    field: db_err
                        .message()
                        .rsplit(": ")
                        .next()
                        .unwrap_or("unknown")
                        .to_string(),
                    value: "unknown".to_string(),
                },
                SqlxErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                _ => DbError::Query(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                DbError::Connection(err.to_string())
            }
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Document(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_constraint_failures_are_classified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pool = db.pool();

        sqlx::query("CREATE TABLE tags (name TEXT NOT NULL UNIQUE)")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE tagged (tag TEXT NOT NULL REFERENCES tags(name))")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO tags (name) VALUES ('red')")
            .execute(pool)
            .await
            .unwrap();

        let err: DbError = sqlx::query("INSERT INTO tags (name) VALUES ('red')")
            .execute(pool)
            .await
            .unwrap_err()
            .into();
        match err {
            DbError::UniqueViolation { field, .. } => assert_eq!(field, "tags.name"),
            other => panic!("expected unique violation, got {other:?}"),
        }

        let err: DbError = sqlx::query("INSERT INTO tagged (tag) VALUES ('blue')")
            .execute(pool)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let err: DbError = sqlx::query("SELECT * FROM missing")
            .execute(pool)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::Query(_)));
    }
}
