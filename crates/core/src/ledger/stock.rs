//! Product stock arithmetic.
//!
//! Every stock-touching record applies exactly one movement to its product.
//! Reversing a record applies the inverse movement, computed from the
//! quantity stored on the record rather than from current state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;

/// A change to a product's on-hand quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockMovement {
    /// Stock comes in (purchase, opening stock). Always succeeds.
    Credit(i32),
    /// Stock goes out (sale, internal consumption). Requires enough on hand.
    Debit(i32),
}

impl StockMovement {
    /// Returns the movement that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Credit(q) => Self::Debit(q),
            Self::Debit(q) => Self::Credit(q),
        }
    }

    /// Applies the movement to `on_hand` and returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientStock` if a debit exceeds the
    /// quantity on hand, and `LedgerError::Validation` if a credit would
    /// overflow the quantity column.
    pub fn apply(self, product_id: Uuid, on_hand: i32) -> Result<i32, LedgerError> {
        match self {
            Self::Credit(q) => on_hand
                .checked_add(q)
                .ok_or_else(|| LedgerError::validation("Stock quantity is out of range")),
            Self::Debit(q) if on_hand >= q => Ok(on_hand - q),
            Self::Debit(q) => Err(LedgerError::InsufficientStock {
                product_id,
                available: on_hand,
                requested: q,
            }),
        }
    }
}

/// Which way a kind of stock record moves its product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Purchases and opening stock.
    Inbound,
    /// Sales and consumed products.
    Outbound,
}

impl StockDirection {
    /// The movement a record of this direction with `quantity` applies.
    #[must_use]
    pub const fn movement(self, quantity: i32) -> StockMovement {
        match self {
            Self::Inbound => StockMovement::Credit(quantity),
            Self::Outbound => StockMovement::Debit(quantity),
        }
    }
}

/// Checks a quantity entered manually on a product (create or correction).
///
/// # Errors
///
/// Returns `LedgerError::Validation` for negative quantities.
pub fn validate_on_hand(quantity: i32) -> Result<i32, LedgerError> {
    if quantity < 0 {
        return Err(LedgerError::validation("Quantity cannot be negative"));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StockMovement::Credit(10), 0, 10)]
    #[case(StockMovement::Credit(3), 7, 10)]
    #[case(StockMovement::Debit(5), 5, 0)]
    #[case(StockMovement::Debit(2), 9, 7)]
    fn test_apply_movement(
        #[case] movement: StockMovement,
        #[case] on_hand: i32,
        #[case] expected: i32,
    ) {
        assert_eq!(movement.apply(Uuid::nil(), on_hand).unwrap(), expected);
    }

    #[test]
    fn test_debit_beyond_stock_fails() {
        let product_id = Uuid::new_v4();
        let err = StockMovement::Debit(1).apply(product_id, 0).unwrap_err();

        match err {
            LedgerError::InsufficientStock {
                product_id: id,
                available,
                requested,
            } => {
                assert_eq!(id, product_id);
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_reversing_a_credit_is_checked() {
        // Opening stock of 10, then 8 sold: deleting the opening stock needs 10 on hand.
        let reversal = StockDirection::Inbound.movement(10).inverse();
        assert!(reversal.apply(Uuid::nil(), 2).is_err());
    }

    #[test]
    fn test_inverse_restores_quantity() {
        let movement = StockDirection::Outbound.movement(4);
        let after = movement.apply(Uuid::nil(), 6).unwrap();
        let restored = movement.inverse().apply(Uuid::nil(), after).unwrap();
        assert_eq!(restored, 6);
    }

    #[test]
    fn test_credit_overflow_is_rejected() {
        assert!(StockMovement::Credit(1).apply(Uuid::nil(), i32::MAX).is_err());
    }

    #[test]
    fn test_validate_on_hand() {
        assert_eq!(validate_on_hand(0).unwrap(), 0);
        assert!(validate_on_hand(-1).is_err());
    }
}
