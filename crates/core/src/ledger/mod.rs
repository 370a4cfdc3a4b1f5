//! Stock and balance ledger logic.
//!
//! This module holds the arithmetic every inventory or money-moving record
//! must respect:
//! - Stock movements with the non-negative debit check
//! - Customer and supplier running balances
//! - Line amount derivation and input validation
//! - Error types for ledger operations

pub mod amounts;
pub mod balance;
pub mod error;
pub mod stock;

#[cfg(test)]
mod balance_props;

pub use amounts::{LineAmounts, require_text, validate_price, validate_quantity};
pub use balance::{Charge, CustomerBalance, CustomerCharge, SupplierBalance, validate_payment_amount};
pub use error::{EntityKind, LedgerError};
pub use stock::{StockDirection, StockMovement, validate_on_hand};
