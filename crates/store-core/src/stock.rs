//! # Stock Rules
//!
//! Availability checks and the debit/credit arithmetic shared by the order
//! and sale lifecycles.
//!
//! ```text
//! items ──► aggregate_demand ──► per product: check_available ──► adjust
//!           (sum repeated lines)    (0 < requested ≤ available)    (± qty)
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::validate_quantity;

/// Direction of an inventory adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Stock leaves inventory (order or sale created).
    Debit,
    /// Stock returns to inventory (cancel, refund).
    Credit,
}

impl StockDirection {
    /// Applies the adjustment. No bounds are enforced here.
    #[inline]
    pub const fn apply(&self, current: i64, quantity: i64) -> i64 {
        match self {
            StockDirection::Debit => current - quantity,
            StockDirection::Credit => current + quantity,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StockDirection::Debit => "debit",
            StockDirection::Credit => "credit",
        }
    }
}

/// Sums the requested quantity per product, keeping first-seen order.
///
/// Every quantity must be positive and within the stock bound. The running
/// total per product is checked for overflow.
///
/// ## Example
/// ```rust
/// use store_core::stock::aggregate_demand;
///
/// let demand = aggregate_demand(&[(1, 2), (2, 1), (1, 3)]).unwrap();
/// assert_eq!(demand, vec![(1, 5), (2, 1)]);
/// ```
pub fn aggregate_demand(lines: &[(i64, i64)]) -> CoreResult<Vec<(i64, i64)>> {
    let mut demand: Vec<(i64, i64)> = Vec::with_capacity(lines.len());

    for &(product_id, quantity) in lines {
        validate_quantity(quantity)?;
        match demand.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, total)) => {
                *total = total
                    .checked_add(quantity)
                    .ok_or_else(|| ValidationError::OutOfRange {
                        field: "quantity".to_string(),
                        min: 1,
                        max: i64::MAX,
                    })?;
            }
            None => demand.push((product_id, quantity)),
        }
    }

    Ok(demand)
}

/// Checks that `requested` units of `product` can be taken from `available`.
///
/// Zero stock is always insufficient, whatever the request.
pub fn check_available(product: &str, available: i64, requested: i64) -> CoreResult<()> {
    if available <= 0 || available < requested {
        return Err(CoreError::InsufficientStock {
            product: product.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

/// Checks that a previously reserved quantity is still backed by inventory.
///
/// Used when an order becomes a sale: the order already debited its items,
/// so only a negative balance means the reservation was lost.
pub fn check_reservation(product: &str, available: i64, reserved: i64) -> CoreResult<()> {
    if available < 0 {
        return Err(CoreError::InsufficientStock {
            product: product.to_string(),
            available,
            requested: reserved,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_direction_apply() {
        assert_eq!(StockDirection::Debit.apply(10, 3), 7);
        assert_eq!(StockDirection::Credit.apply(7, 3), 10);
        // No lower bound at this step.
        assert_eq!(StockDirection::Debit.apply(1, 3), -2);
    }

    #[test]
    fn test_aggregate_rejects_non_positive() {
        let err = aggregate_demand(&[(1, 2), (2, 0)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(aggregate_demand(&[(1, -1)]).is_err());
    }

    #[test]
    fn test_aggregate_rejects_oversized_lines() {
        let err = aggregate_demand(&[(1, i64::MAX), (1, 1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let max = crate::MAX_STOCK_QUANTITY;
        assert_eq!(aggregate_demand(&[(1, max), (1, max)]).unwrap(), vec![(1, 2 * max)]);
    }

    #[test]
    fn test_check_available() {
        assert!(check_available("Coffee", 5, 5).is_ok());
        assert!(check_available("Coffee", 5, 1).is_ok());

        let err = check_available("Coffee", 4, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(err.to_string().contains("Coffee"));

        assert!(check_available("Coffee", 0, 1).is_err());
    }

    #[test]
    fn test_check_reservation() {
        assert!(check_reservation("Tea", 0, 3).is_ok());
        assert!(check_reservation("Tea", -1, 3).is_err());
    }
}
