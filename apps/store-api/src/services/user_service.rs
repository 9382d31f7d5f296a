//! User accounts. Clients and sellers referenced by orders and sales are
//! users.

use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::password::{hash_password, verify_password};
use store_core::validation::{validate_email, validate_name, validate_password};
use store_core::{User, ValidationError};
use store_db::{Database, NewUser, UserChanges};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none() && self.email.is_none() && self.password.is_none() {
            return Err(ValidationError::Required {
                field: "name, email or password".to_string(),
            });
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        UserService { db }
    }

    pub async fn create(&self, input: CreateUser) -> AppResult<User> {
        input.validate()?;

        if self.db.users().get_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let user = self
            .db
            .users()
            .insert(&NewUser {
                name: input.name,
                email: input.email,
                password_hash: hash_password(&input.password)?,
            })
            .await?;

        info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.db.users().list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.db
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.db
            .users()
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User", email))
    }

    /// Partial update.
    ///
    /// Supplying the current email or password is a validation error; a new
    /// email already used by someone else is a conflict.
    pub async fn update(&self, id: i64, input: UpdateUser) -> AppResult<User> {
        input.validate()?;
        let current = self.get(id).await?;

        if let Some(email) = &input.email {
            if *email == current.email {
                return Err(ValidationError::Unchanged {
                    field: "email".to_string(),
                }
                .into());
            }
            if self.db.users().get_by_email(email).await?.is_some() {
                return Err(AppError::conflict(format!(
                    "Email '{email}' is already registered"
                )));
            }
        }

        let password_hash = match &input.password {
            Some(password) if verify_password(password, &current.password_hash) => {
                return Err(ValidationError::Unchanged {
                    field: "password".to_string(),
                }
                .into());
            }
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = self
            .db
            .users()
            .update(
                id,
                &UserChanges {
                    name: input.name,
                    email: input.email,
                    password_hash,
                },
            )
            .await?;

        info!(user_id = id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.db.users().delete(id).await? {
            return Err(AppError::not_found("User", id));
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}

/// Loads a user playing `role` in an order or sale ("Client", "Seller").
pub(crate) async fn require_user(db: &Database, id: i64, role: &str) -> AppResult<User> {
    db.users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(role, id))
}
