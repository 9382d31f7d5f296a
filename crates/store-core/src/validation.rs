//! # Validation Module
//!
//! Input validation rules, applied by the HTTP layer before a service runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request extraction (axum + serde)                            │
//! │  ├── Malformed JSON, wrong types, unknown enum values                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, ranges, formats                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Services                                                     │
//! │  ├── Existence, uniqueness, stock, status rules                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  └── NOT NULL, UNIQUE, FOREIGN KEY                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::DeliveryAddress;
use crate::{MAX_PRICE_CENTS, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a trimmed text field length, counted in characters.
pub fn validate_text(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    let len = value.chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// User and product names: 2 to 100 characters.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 2, 100)
}

/// Product descriptions: 2 to 200 characters.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    validate_text("description", description, 2, 200)
}

/// Passwords: 6 to 100 characters. Not trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();
    if len < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }
    if len > 100 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 100,
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - At most 100 characters
/// - Exactly one `@`, non-empty local part
/// - Domain contains a dot that is neither first nor last
///
/// ## Example
/// ```rust
/// use store_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana@localhost").is_err());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email, 3, 100)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let email = email.trim();
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.find('.') {
        Some(idx) if idx > 0 && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Cancel and refund reasons.
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    validate_text("reason", reason, 1, 500)
}

/// Validates a document (order/sale) id.
///
/// ## Example
/// ```rust
/// use store_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Requires every mandatory address field to be filled in.
pub fn validate_delivery_address(address: &DeliveryAddress) -> ValidationResult<()> {
    let required = [
        ("deliveryAddress.street", &address.street),
        ("deliveryAddress.district", &address.district),
        ("deliveryAddress.city", &address.city),
        ("deliveryAddress.state", &address.state),
        ("deliveryAddress.postalCode", &address.postal_code),
        ("deliveryAddress.phone", &address.phone),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Relational ids are positive.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Line item quantity: strictly positive, at most 1,000,000.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_STOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_QUANTITY,
        });
    }
    Ok(())
}

/// Stocked quantity between `min` and 1,000,000.
pub fn validate_stock_quantity(qty: i64, min: i64) -> ValidationResult<()> {
    if qty < min || qty > MAX_STOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min,
            max: MAX_STOCK_QUANTITY,
        });
    }
    Ok(())
}

/// Product price in cents, 0 to 1,000,000.00.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }
    Ok(())
}

/// Discounts and fees on documents: same range as a product price.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }
    Ok(())
}

pub fn validate_estimated_minutes(minutes: i64) -> ValidationResult<()> {
    if minutes <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "estimatedMinutes".to_string(),
        });
    }
    Ok(())
}

/// Orders and sales need at least one item.
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
