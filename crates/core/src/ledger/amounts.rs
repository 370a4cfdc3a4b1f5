//! Line amounts for sales, purchases and treatments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::Charge;
use super::error::LedgerError;

/// Derived money fields of a transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// `quantity * price`.
    pub total: Decimal,
    /// Amount paid up front.
    pub paid: Decimal,
    /// `total - paid`.
    pub rest: Decimal,
}

impl LineAmounts {
    /// Validates the inputs of a line and derives its amounts.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` when the quantity is not positive,
    /// the price or paid amount is negative, or the total does not fit a
    /// decimal.
    pub fn compute(quantity: i32, price: Decimal, paid: Decimal) -> Result<Self, LedgerError> {
        validate_quantity(quantity)?;
        validate_price(price)?;
        if paid < Decimal::ZERO {
            return Err(LedgerError::validation("Paid amount cannot be negative"));
        }

        let total = Decimal::from(quantity)
            .checked_mul(price)
            .ok_or_else(LedgerError::amount_out_of_range)?;
        let rest = total
            .checked_sub(paid)
            .ok_or_else(LedgerError::amount_out_of_range)?;
        Ok(Self { total, paid, rest })
    }

    /// The balance effect of this line on its party.
    #[must_use]
    pub const fn charge(&self) -> Charge {
        Charge::new(self.total, self.paid)
    }
}

/// Checks a transaction quantity.
///
/// # Errors
///
/// Returns `LedgerError::Validation` unless the quantity is strictly positive.
pub fn validate_quantity(quantity: i32) -> Result<i32, LedgerError> {
    if quantity <= 0 {
        return Err(LedgerError::validation("Quantity must be greater than 0"));
    }
    Ok(quantity)
}

/// Checks a unit price.
///
/// # Errors
///
/// Returns `LedgerError::Validation` for negative prices.
pub fn validate_price(price: Decimal) -> Result<Decimal, LedgerError> {
    if price < Decimal::ZERO {
        return Err(LedgerError::validation("Price cannot be negative"));
    }
    Ok(price)
}

/// Trims a required text field and rejects it when empty.
///
/// # Errors
///
/// Returns `LedgerError::Validation` naming the field.
pub fn require_text(field: &str, value: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
