//! Error types for the Store API.
//!
//! Every handler and service returns [`AppError`]. Domain and database errors
//! convert into it through `From`, so `?` does the classification.
//!
//! | Code                | HTTP |
//! |---------------------|------|
//! | `ValidationError`   | 400  |
//! | `InvalidState`      | 400  |
//! | `InsufficientStock` | 400  |
//! | `NotFound`          | 404  |
//! | `Conflict`          | 409  |
//! | `InternalError`     | 500  |
//!
//! Internal errors are logged with their details and reach the client as a
//! generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::response::ApiResponse;
use store_core::{CoreError, ErrorKind, ValidationError};
use store_db::DbError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error classification exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Conflict,
    InvalidState,
    InsufficientStock,
    InternalError,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::InvalidState
            | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::InvalidState => ErrorCode::InvalidState,
            ErrorKind::InsufficientStock => ErrorCode::InsufficientStock,
            ErrorKind::Internal => ErrorCode::InternalError,
        }
    }
}

/// Store API error.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Conflict, message)
    }

    /// Logs `detail` and hides it from the client.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "Internal error occurred");
        AppError::new(ErrorCode::InternalError, INTERNAL_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.code.http_status()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err.kind() {
            ErrorKind::Internal => AppError::internal(err),
            kind => AppError::new(kind.into(), err.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Maps database failures.
///
/// ```text
/// DbError::NotFound            → 404
/// DbError::UniqueViolation     → 409
/// DbError::ForeignKeyViolation → 409 (row still referenced)
/// anything else                → 500, logged
/// ```
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                AppError::conflict(format!("{field} '{value}' already exists"))
            }
            DbError::ForeignKeyViolation { .. } => {
                AppError::conflict("Record is referenced by other records")
            }
            other => AppError::internal(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: AppError = CoreError::not_found("Order", "abc").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: AppError = CoreError::InvalidTransition {
            from: "delivered".to_string(),
            to: "preparing".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::InvalidState);

        let err: AppError = CoreError::InsufficientStock {
            product: "Coffee".to_string(),
            available: 0,
            requested: 1,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err: AppError = CoreError::Conflict("duplicate sale".to_string()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: AppError = CoreError::Internal("pool poisoned at 0x1f".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, INTERNAL_MESSAGE);

        let err: AppError = DbError::Query("no such table: orders".to_string()).into();
        assert_eq!(err.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: AppError = DbError::duplicate("users.email", "ana@example.com").into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.message.contains("ana@example.com"));

        let err: AppError = DbError::not_found("Inventory", 3).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
