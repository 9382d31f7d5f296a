//! # Domain Types
//!
//! Core domain types used throughout the store manager.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Relational store (i64 ids)          Document store (UUID ids)          │
//! │  ┌─────────────┐                     ┌─────────────────────────────┐   │
//! │  │ User        │◄── client/seller ───│ Order                       │   │
//! │  ├─────────────┤                     │  items: Vec<OrderItem>      │   │
//! │  │ Product     │◄── product_id ──────│  status: OrderStatus        │   │
//! │  ├─────────────┤                     ├─────────────────────────────┤   │
//! │  │ Inventory   │ one per product     │ Sale                        │   │
//! │  └─────────────┘                     │  items: Vec<SaleItem>       │   │
//! │                                      │  order_id ──► Order (0..1)  │   │
//! │                                      └─────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Orders and sales copy client, seller and product names at write time.
//! Those copies are never refreshed when the source record changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// wire names are listed explicitly.
macro_rules! wire_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Wire representation (matches the serde name).
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: $ty::ALL.iter().map(|v| v.as_str().to_string()).collect(),
                    }),
                }
            }
        }
    };
}

// =============================================================================
// User
// =============================================================================

/// A store user. Acts as client or seller on orders and sales.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be ordered or sold.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    /// Unique display name.
    pub name: String,

    pub description: String,

    /// Price in cents.
    pub price_cents: i64,

    /// User that registered the product.
    pub user_id: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock record for a single product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: i64,
    pub product_id: i64,
    /// Units on hand. Only the availability check keeps this from going negative.
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Enumerations
// =============================================================================

/// Order fulfillment status.
///
/// ```text
/// received ─► confirmed ─► preparing ─► ready ─┬─► out_for_delivery ─► delivered
///     │           │            │          │    └─► delivered (pickup)
///     └───────────┴────────────┴──────────┴──────────► canceled
///
/// any non-terminal ── sale derivation ──► sold
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Canceled,
    /// Converted into a sale.
    Sold,
}

wire_enum!(OrderStatus, "status", {
    Received => "received",
    Confirmed => "confirmed",
    Preparing => "preparing",
    Ready => "ready",
    OutForDelivery => "out_for_delivery",
    Delivered => "delivered",
    Canceled => "canceled",
    Sold => "sold",
});

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Received
    }
}

/// How the order reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

wire_enum!(DeliveryType, "deliveryType", {
    Delivery => "delivery",
    Pickup => "pickup",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
    BankTransfer,
}

wire_enum!(PaymentMethod, "paymentMethod", {
    Cash => "cash",
    CreditCard => "credit_card",
    DebitCard => "debit_card",
    Pix => "pix",
    BankTransfer => "bank_transfer",
});

/// Sale payment status.
///
/// `pending → {paid, canceled}`, `paid → {refunded}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Paid,
    Canceled,
    Refunded,
}

wire_enum!(SaleStatus, "status", {
    Pending => "pending",
    Paid => "paid",
    Canceled => "canceled",
    Refunded => "refunded",
});

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// Where a delivery order is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// A line item in an order. Product name is frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// quantity × unit price.
    pub line_total_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A customer order, stored as a self-contained document.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// UUID v4.
    pub id: String,
    pub client_id: i64,
    pub client_name: String,
    pub client_email: String,
    pub items: Vec<OrderItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub delivery_fee_cents: i64,
    /// subtotal − discount + delivery fee.
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub delivery_type: DeliveryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
    /// Minutes until the order is expected to be ready.
    pub estimated_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub seller_id: i64,
    pub seller_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Set when the order enters `ready`. Drives the urgent report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub ready_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// (product id, quantity) pairs, as consumed by the inventory adjustment.
    pub fn stock_lines(&self) -> Vec<(i64, i64)> {
        self.items
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// quantity × unit price, before the item discount.
    pub line_total_cents: i64,
    pub discount_cents: i64,
}

/// A commercial transaction, optionally derived from an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// UUID v4.
    pub id: String,
    pub client_id: i64,
    pub client_name: String,
    pub client_email: String,
    pub seller_id: i64,
    pub seller_name: String,
    pub items: Vec<SaleItem>,
    /// Σ line totals.
    pub subtotal_cents: i64,
    /// Σ item discounts.
    pub discount_cents: i64,
    /// subtotal − discount.
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    /// Source order, when the sale was derived from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Reason given on cancel or refund.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// (product id, quantity) pairs, as consumed by the inventory adjustment.
    pub fn stock_lines(&self) -> Vec<(i64, i64)> {
        self.items
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect()
    }
}

/// Generates a new document id.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(OrderStatus::OutForDelivery.as_str(), "out_for_delivery");
        assert_eq!(
            "out_for_delivery".parse::<OrderStatus>().unwrap(),
            OrderStatus::OutForDelivery
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"out_for_delivery\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"credit_card\""
        );
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
        assert!("settled".parse::<SaleStatus>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Received);
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn test_user_hash_is_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "ana@example.com");
    }

    #[test]
    fn test_document_ids_are_uuids() {
        let id = new_document_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
