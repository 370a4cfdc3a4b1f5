//! Ledger error types.
//!
//! This module defines the errors every ledger-touching operation can
//! surface: missing (or foreign-clinic) records, malformed input, stock
//! shortfalls, protected-state violations and lost optimistic-lock races.

use thiserror::Error;
use uuid::Uuid;
use vetledger_shared::AppError;

/// Kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Inventory product.
    Product,
    /// Customer (party owing for sales and treatments).
    Customer,
    /// Supplier (party owed for purchases).
    Supplier,
    /// Customer or supplier payment sub-record.
    Payment,
    /// Sale record.
    Sale,
    /// Purchase record.
    Purchase,
    /// Treatment record.
    Treatment,
    /// Opening stock record.
    OpeningStock,
    /// Consumed product record.
    ConsumedProduct,
    /// Appointment.
    Appointment,
}

impl EntityKind {
    /// Human-readable name used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Customer => "Customer",
            Self::Supplier => "Supplier",
            Self::Payment => "Payment",
            Self::Sale => "Sale",
            Self::Purchase => "Purchase",
            Self::Treatment => "Treatment",
            Self::OpeningStock => "Opening stock record",
            Self::ConsumedProduct => "Consumed product record",
            Self::Appointment => "Appointment",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Record is absent or belongs to another clinic. The two cases are
    /// deliberately indistinguishable.
    #[error("{0} not found")]
    NotFound(EntityKind),

    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// A debit would drive the product's quantity below zero.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The product being debited.
        product_id: Uuid,
        /// Quantity on hand when the debit was attempted.
        available: i32,
        /// Quantity the debit asked for.
        requested: i32,
    },

    /// The operation is not allowed in the record's current state.
    #[error("{0}")]
    ConflictingState(String),

    /// Another writer changed the record between read and write.
    #[error("Concurrent modification detected for record {0}, please retry")]
    ConcurrentModification(Uuid),
}

impl LedgerError {
    /// Shorthand for a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// A money amount that does not fit the decimal range.
    #[must_use]
    pub fn amount_out_of_range() -> Self {
        Self::validation("Amount is out of range")
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ConflictingState(_) => "CONFLICTING_STATE",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns true if re-running the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Validation(msg) => Self::Validation(msg),
            LedgerError::InsufficientStock { .. } => Self::InsufficientStock(err.to_string()),
            LedgerError::ConflictingState(msg) => Self::Conflict(msg),
            LedgerError::ConcurrentModification(_) => Self::Conflict(err.to_string()),
        }
    }
}
