//! # User Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use store_core::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// Fields for a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists all users ordered by id.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Ok(User)` - Inserted user with its generated id
    /// * `Err(DbError::UniqueViolation)` - Email already exists
    pub async fn insert(&self, user: &NewUser) -> DbResult<User> {
        debug!(email = %user.email, "Inserting user");

        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &user.email),
            other => other,
        })?;

        Ok(created)
    }

    /// Applies a partial update and returns the stored row.
    pub async fn update(&self, id: i64, changes: &UserChanges) -> DbResult<User> {
        debug!(id = %id, "Updating user");

        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                password_hash = COALESCE(?4, password_hash),
                updated_at = ?5
            WHERE id = ?1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.password_hash.as_deref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes a user. Returns false if no row matched.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana Souza".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = repo.insert(&new_user("ana@example.com")).await.unwrap();
        assert!(user.id > 0);

        let by_email = repo.get_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(repo.get_by_id(user.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.insert(&new_user("ana@example.com")).await.unwrap();
        let err = repo.insert(&new_user("ana@example.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();
        let user = repo.insert(&new_user("ana@example.com")).await.unwrap();

        let changes = UserChanges {
            name: Some("Ana Lima".to_string()),
            ..Default::default()
        };
        let updated = repo.update(user.id, &changes).await.unwrap();
        assert_eq!(updated.name, "Ana Lima");
        assert_eq!(updated.email, "ana@example.com");

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(matches!(
            repo.update(user.id, &changes).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
