//! # Error Types
//!
//! Domain-specific error types for store-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  store-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  store-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  store-api errors                                                      │
//! │  └── AppError         - What HTTP clients see                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┬─► AppError → JSON envelope       │
//! │                          DbError  ──┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant reports an [`ErrorKind`], which is what the API layer maps
//! onto an HTTP status code.

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Classification of a domain failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input, bad date range, unknown enum value.
    Validation,
    /// A referenced user, product, inventory record, order or sale is missing.
    NotFound,
    /// Duplicate name/email, or a second sale for the same order.
    Conflict,
    /// The current status does not allow the requested operation.
    InvalidState,
    /// Requested quantity exceeds what is available.
    InsufficientStock,
    /// Anything unexpected. Details are never shown to callers.
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Uniqueness rule violated.
    #[error("{0}")]
    Conflict(String),

    /// Status change not present in the transition table.
    ///
    /// ## When This Occurs
    /// ```text
    /// Order status: delivered
    ///      │
    ///      ▼
    /// PATCH /orders/{id}/status { "status": "preparing" }
    ///      │
    ///      ▼
    /// InvalidTransition { from: "delivered", to: "preparing" }
    /// ```
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Operation not allowed in the current status.
    #[error("{0}")]
    InvalidState(String),

    /// Not enough stock to satisfy a line item.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invariant broken somewhere below the business layer.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Returns the classification used for HTTP status mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::InvalidTransition { .. } | CoreError::InvalidState(_) => {
                ErrorKind::InvalidState
            }
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// They are raised before any store is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Update supplied the value the record already has.
    #[error("{field} is unchanged")]
    Unchanged { field: String },

    /// Date window with start after end.
    #[error("start date must not be after end date")]
    InvalidDateRange,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Espresso Beans".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Espresso Beans: available 3, requested 5"
        );

        let err = CoreError::not_found("Order", "abc");
        assert_eq!(err.to_string(), "Order not found: abc");
    }

    #[test]
    fn test_kind_classification() {
        let transition = CoreError::InvalidTransition {
            from: "delivered".to_string(),
            to: "preparing".to_string(),
        };
        assert_eq!(transition.kind(), ErrorKind::InvalidState);
        assert_eq!(
            CoreError::Conflict("dup".to_string()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::from(ValidationError::InvalidDateRange).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "reason".to_string(),
        };
        assert_eq!(err.to_string(), "reason is required");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        };
        assert_eq!(err.to_string(), "name must be at least 2 characters");
    }
}
