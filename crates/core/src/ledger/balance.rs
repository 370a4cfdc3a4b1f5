//! Running balances on customers and suppliers.
//!
//! Accumulators (`total_sales`, `total_treatments`, `total_purchases`,
//! `total_paid`) move with the records and payments that feed them. The
//! outstanding `total_rest` is never adjusted on its own: it is recomputed
//! from the accumulators after every change.
//!
//! Reversals clamp accumulators at zero so that balances that drifted before
//! this service owned them never go negative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Money effect of one sale, treatment or purchase on its party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    /// Amount owed for the record (`quantity * price`).
    pub total: Decimal,
    /// Amount paid at the time of the record.
    pub paid: Decimal,
}

impl Charge {
    /// Creates a charge.
    #[must_use]
    pub const fn new(total: Decimal, paid: Decimal) -> Self {
        Self { total, paid }
    }
}

/// Which customer accumulator a charge feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerCharge {
    /// Product sales feed `total_sales`.
    Sale,
    /// Treatments feed `total_treatments`.
    Treatment,
}

fn checked_add(value: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    value
        .checked_add(amount)
        .ok_or_else(LedgerError::amount_out_of_range)
}

fn checked_sub(value: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    value
        .checked_sub(amount)
        .ok_or_else(LedgerError::amount_out_of_range)
}

fn clamp_sub(value: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    Ok(checked_sub(value, amount)?.max(Decimal::ZERO))
}

/// Customer running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerBalance {
    /// Sum of sale totals.
    pub total_sales: Decimal,
    /// Sum of treatment totals.
    pub total_treatments: Decimal,
    /// Sum of amounts paid on records and through payments.
    pub total_paid: Decimal,
    /// `total_sales + total_treatments - total_paid`.
    pub total_rest: Decimal,
}

impl CustomerBalance {
    /// Builds a balance from stored accumulators, recomputing the rest.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the rest does not fit a decimal.
    pub fn from_totals(
        total_sales: Decimal,
        total_treatments: Decimal,
        total_paid: Decimal,
    ) -> Result<Self, LedgerError> {
        let total_rest = checked_sub(checked_add(total_sales, total_treatments)?, total_paid)?;
        Ok(Self {
            total_sales,
            total_treatments,
            total_paid,
            total_rest,
        })
    }

    /// Books a new sale or treatment.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if a total would overflow. The
    /// balance is left unchanged.
    pub fn apply(&mut self, kind: CustomerCharge, charge: Charge) -> Result<(), LedgerError> {
        let (sales, treatments) = match kind {
            CustomerCharge::Sale => (
                checked_add(self.total_sales, charge.total)?,
                self.total_treatments,
            ),
            CustomerCharge::Treatment => {
                (self.total_sales, checked_add(self.total_treatments, charge.total)?)
            }
        };
        *self = Self::from_totals(sales, treatments, checked_add(self.total_paid, charge.paid)?)?;
        Ok(())
    }

    /// Removes a previously booked sale or treatment.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if a total would overflow.
    pub fn reverse(&mut self, kind: CustomerCharge, charge: Charge) -> Result<(), LedgerError> {
        let (sales, treatments) = match kind {
            CustomerCharge::Sale => (
                clamp_sub(self.total_sales, charge.total)?,
                self.total_treatments,
            ),
            CustomerCharge::Treatment => {
                (self.total_sales, clamp_sub(self.total_treatments, charge.total)?)
            }
        };
        *self = Self::from_totals(sales, treatments, clamp_sub(self.total_paid, charge.paid)?)?;
        Ok(())
    }

    /// Records a payment.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `total_paid` would overflow.
    pub fn add_payment(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.set_paid(checked_add(self.total_paid, amount)?)
    }

    /// Replaces the amount of an existing payment.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `total_paid` would overflow.
    pub fn change_payment(
        &mut self,
        old_amount: Decimal,
        new_amount: Decimal,
    ) -> Result<(), LedgerError> {
        let paid = checked_add(checked_sub(self.total_paid, old_amount)?, new_amount)?;
        self.set_paid(paid.max(Decimal::ZERO))
    }

    /// Removes a payment, flooring `total_paid` at zero.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the rest would overflow.
    pub fn remove_payment(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.set_paid(clamp_sub(self.total_paid, amount)?)
    }

    fn set_paid(&mut self, total_paid: Decimal) -> Result<(), LedgerError> {
        *self = Self::from_totals(self.total_sales, self.total_treatments, total_paid)?;
        Ok(())
    }

    /// Returns true when the rest matches the accumulators.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        Self::from_totals(self.total_sales, self.total_treatments, self.total_paid)
            .is_ok_and(|balance| balance.total_rest == self.total_rest)
    }
}

/// Supplier running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplierBalance {
    /// Sum of purchase totals.
    pub total_purchases: Decimal,
    /// Sum of payments made to the supplier.
    pub total_paid: Decimal,
    /// `total_purchases - total_paid`.
    pub total_rest: Decimal,
}

impl SupplierBalance {
    /// Builds a balance from stored accumulators, recomputing the rest.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the rest does not fit a decimal.
    pub fn from_totals(total_purchases: Decimal, total_paid: Decimal) -> Result<Self, LedgerError> {
        Ok(Self {
            total_purchases,
            total_paid,
            total_rest: checked_sub(total_purchases, total_paid)?,
        })
    }

    /// Books a purchase. Purchases carry no payment; the paid part of the
    /// charge is expected to be zero and is applied as given.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if a total would overflow. The
    /// balance is left unchanged.
    pub fn apply(&mut self, charge: Charge) -> Result<(), LedgerError> {
        *self = Self::from_totals(
            checked_add(self.total_purchases, charge.total)?,
            checked_add(self.total_paid, charge.paid)?,
        )?;
        Ok(())
    }

    /// Removes a previously booked purchase.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if a total would overflow.
    pub fn reverse(&mut self, charge: Charge) -> Result<(), LedgerError> {
        *self = Self::from_totals(
            clamp_sub(self.total_purchases, charge.total)?,
            clamp_sub(self.total_paid, charge.paid)?,
        )?;
        Ok(())
    }

    /// Records a payment.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `total_paid` would overflow.
    pub fn add_payment(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.set_paid(checked_add(self.total_paid, amount)?)
    }

    /// Replaces the amount of an existing payment.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `total_paid` would overflow.
    pub fn change_payment(
        &mut self,
        old_amount: Decimal,
        new_amount: Decimal,
    ) -> Result<(), LedgerError> {
        let paid = checked_add(checked_sub(self.total_paid, old_amount)?, new_amount)?;
        self.set_paid(paid.max(Decimal::ZERO))
    }

    /// Removes a payment, flooring `total_paid` at zero.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the rest would overflow.
    pub fn remove_payment(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.set_paid(clamp_sub(self.total_paid, amount)?)
    }

    fn set_paid(&mut self, total_paid: Decimal) -> Result<(), LedgerError> {
        *self = Self::from_totals(self.total_purchases, total_paid)?;
        Ok(())
    }

    /// Returns true when the rest matches the accumulators.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        Self::from_totals(self.total_purchases, self.total_paid)
            .is_ok_and(|balance| balance.total_rest == self.total_rest)
    }
}

/// Checks a payment amount.
///
/// # Errors
///
/// Returns `LedgerError::Validation` unless the amount is strictly positive.
pub fn validate_payment_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("Payment amount must be greater than 0"));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_round_trip_restores_rest() {
        let mut balance = CustomerBalance::from_totals(dec!(1000), dec!(0), dec!(400)).unwrap();
        assert_eq!(balance.total_rest, dec!(600));

        balance.add_payment(dec!(600)).unwrap();
        assert_eq!(balance.total_rest, dec!(0));

        balance.remove_payment(dec!(600)).unwrap();
        assert_eq!(balance.total_rest, dec!(600));
        assert_eq!(balance.total_paid, dec!(400));
    }

    #[test]
    fn test_treatment_feeds_its_own_accumulator() {
        let mut balance = CustomerBalance::default();
        balance.apply(CustomerCharge::Sale, Charge::new(dec!(100), dec!(20))).unwrap();
        balance.apply(CustomerCharge::Treatment, Charge::new(dec!(50), dec!(50))).unwrap();

        assert_eq!(balance.total_sales, dec!(100));
        assert_eq!(balance.total_treatments, dec!(50));
        assert_eq!(balance.total_paid, dec!(70));
        assert_eq!(balance.total_rest, dec!(80));
    }

    #[test]
    fn test_reverse_clamps_drifted_totals() {
        let mut balance = CustomerBalance::from_totals(dec!(30), dec!(0), dec!(10)).unwrap();
        balance.reverse(CustomerCharge::Sale, Charge::new(dec!(50), dec!(25))).unwrap();

        assert_eq!(balance.total_sales, dec!(0));
        assert_eq!(balance.total_paid, dec!(0));
        assert_eq!(balance.total_rest, dec!(0));
    }

    #[test]
    fn test_remove_payment_floors_at_zero() {
        let mut balance = SupplierBalance::from_totals(dec!(200), dec!(50)).unwrap();
        balance.remove_payment(dec!(80)).unwrap();

        assert_eq!(balance.total_paid, dec!(0));
        assert_eq!(balance.total_rest, dec!(200));
    }

    #[test]
    fn test_change_payment() {
        let mut balance = SupplierBalance::from_totals(dec!(500), dec!(100)).unwrap();
        balance.change_payment(dec!(100), dec!(250)).unwrap();

        assert_eq!(balance.total_paid, dec!(250));
        assert_eq!(balance.total_rest, dec!(250));
    }

    #[test]
    fn test_supplier_purchase_round_trip() {
        let mut balance = SupplierBalance::from_totals(dec!(120), dec!(20)).unwrap();
        let before = balance;
        let charge = Charge::new(dec!(75.50), Decimal::ZERO);

        balance.apply(charge).unwrap();
        assert_eq!(balance.total_rest, dec!(175.50));

        balance.reverse(charge).unwrap();
        assert_eq!(balance, before);
    }

    #[test]
    fn test_from_totals_recomputes_rest() {
        let balance = CustomerBalance::from_totals(dec!(10), dec!(5), dec!(20)).unwrap();
        assert_eq!(balance.total_rest, dec!(-5));
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_second_large_sale_is_rejected_without_change() {
        let mut balance = CustomerBalance::default();
        balance.apply(CustomerCharge::Sale, Charge::new(Decimal::MAX, Decimal::ZERO)).unwrap();
        let before = balance;

        let err = balance
            .apply(CustomerCharge::Sale, Charge::new(Decimal::MAX, Decimal::ZERO))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(balance, before);
    }

    #[rstest]
    #[case::treatment_on_top_of_sales(
        CustomerCharge::Treatment,
        Charge::new(Decimal::MAX, dec!(0))
    )]
    #[case::paid_overflows(CustomerCharge::Sale, Charge::new(dec!(0), Decimal::MAX))]
    fn test_customer_overflow_is_rejected(#[case] kind: CustomerCharge, #[case] charge: Charge) {
        let mut balance = CustomerBalance::from_totals(Decimal::MAX, dec!(0), dec!(1)).unwrap();
        let before = balance;

        let err = balance.apply(kind, charge).unwrap_err();
        assert_eq!(err.to_string(), "Amount is out of range");
        assert_eq!(balance, before);
    }

    #[test]
    fn test_supplier_overflow_is_rejected() {
        let mut balance = SupplierBalance::from_totals(Decimal::MAX, Decimal::MAX).unwrap();

        assert!(balance.apply(Charge::new(dec!(1), Decimal::ZERO)).is_err());
        assert!(balance.add_payment(dec!(1)).is_err());
        assert!(balance.change_payment(dec!(0), dec!(1)).is_err());
        assert_eq!(balance.total_rest, dec!(0));
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(dec!(0.01)).is_ok());
        assert!(validate_payment_amount(dec!(0)).is_err());
        assert!(validate_payment_amount(dec!(-5)).is_err());
    }
}
