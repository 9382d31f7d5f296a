//! # Statistics
//!
//! Date windows for period queries and the shapes returned by the
//! statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DeliveryType, OrderStatus};

// =============================================================================
// Date Window
// =============================================================================

/// Inclusive creation-time window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    /// Builds a window, rejecting `start > end`.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ValidationError::InvalidDateRange);
            }
        }
        Ok(DateWindow { start, end })
    }

    /// Builds a window where both bounds are required.
    pub fn bounded(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        let start = start.ok_or_else(|| ValidationError::Required {
            field: "start".to_string(),
        })?;
        let end = end.ok_or_else(|| ValidationError::Required {
            field: "end".to_string(),
        })?;
        DateWindow::new(Some(start), Some(end))
    }

    /// The unbounded window.
    pub const fn all() -> Self {
        DateWindow {
            start: None,
            end: None,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

// =============================================================================
// Statistics Shapes
// =============================================================================

/// Per-delivery-type slice of the order statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTypeStatistics {
    pub delivery_type: DeliveryType,
    pub count: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub count: i64,
    pub revenue_cents: i64,
    pub average_ticket_cents: i64,
    /// Number of line items across all orders in the window.
    pub item_count: i64,
    pub by_delivery_type: Vec<DeliveryTypeStatistics>,
}

impl OrderStatistics {
    pub fn new(
        count: i64,
        revenue: Money,
        item_count: i64,
        by_delivery_type: Vec<DeliveryTypeStatistics>,
    ) -> Self {
        OrderStatistics {
            count,
            revenue_cents: revenue.cents(),
            average_ticket_cents: Money::average(revenue, count).cents(),
            item_count,
            by_delivery_type,
        }
    }
}

/// Orders grouped by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub status: OrderStatus,
    pub count: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatistics {
    pub count: i64,
    pub revenue_cents: i64,
    pub average_ticket_cents: i64,
    pub item_count: i64,
}

impl SaleStatistics {
    pub fn new(count: i64, revenue: Money, item_count: i64) -> Self {
        SaleStatistics {
            count,
            revenue_cents: revenue.cents(),
            average_ticket_cents: Money::average(revenue, count).cents(),
            item_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_rejects_inverted_range() {
        let now = Utc::now();
        let err = DateWindow::new(Some(now), Some(now - Duration::days(1))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDateRange));

        assert!(DateWindow::new(Some(now), Some(now)).is_ok());
        assert!(DateWindow::new(None, Some(now)).is_ok());
    }

    #[test]
    fn test_bounded_requires_both_ends() {
        let now = Utc::now();
        assert!(DateWindow::bounded(None, Some(now)).is_err());
        assert!(DateWindow::bounded(Some(now), None).is_err());
        assert!(DateWindow::bounded(Some(now), Some(now)).is_ok());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let now = Utc::now();
        let window = DateWindow::new(Some(now), Some(now)).unwrap();
        assert!(window.contains(now));
        assert!(!window.contains(now + Duration::seconds(1)));
        assert!(DateWindow::all().contains(now));
    }

    #[test]
    fn test_average_ticket() {
        let stats = SaleStatistics::new(4, Money::from_cents(10_000), 9);
        assert_eq!(stats.average_ticket_cents, 2_500);

        let empty = OrderStatistics::new(0, Money::zero(), 0, Vec::new());
        assert_eq!(empty.average_ticket_cents, 0);
    }
}
