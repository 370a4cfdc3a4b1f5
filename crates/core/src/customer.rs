//! Customer rules that do not depend on storage.

use crate::ledger::{LedgerError, require_text};

/// Name of the per-clinic default customer that anonymous sales and
/// treatments are booked against.
pub const WALK_IN_CUSTOMER_NAME: &str = "Walk-in customer";

/// Returns true if `name` is the walk-in customer's name.
#[must_use]
pub fn is_walk_in(name: &str) -> bool {
    name == WALK_IN_CUSTOMER_NAME
}

/// Validates a rename of the customer currently called `current`.
///
/// # Errors
///
/// Returns `LedgerError::ConflictingState` when renaming the walk-in
/// customer or giving another customer its name, and
/// `LedgerError::Validation` for an empty name.
pub fn guard_rename(current: &str, new_name: &str) -> Result<String, LedgerError> {
    let new_name = require_text("Name", new_name)?;
    if is_walk_in(current) && new_name != current {
        return Err(LedgerError::ConflictingState(
            "The walk-in customer cannot be renamed".to_string(),
        ));
    }
    if !is_walk_in(current) && is_walk_in(&new_name) {
        return Err(LedgerError::ConflictingState(format!(
            "The name \"{WALK_IN_CUSTOMER_NAME}\" is reserved"
        )));
    }
    Ok(new_name)
}

/// Validates the deletion of the customer called `name`.
///
/// # Errors
///
/// Returns `LedgerError::ConflictingState` for the walk-in customer.
pub fn guard_delete(name: &str) -> Result<(), LedgerError> {
    if is_walk_in(name) {
        return Err(LedgerError::ConflictingState(
            "The walk-in customer cannot be deleted".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_in_cannot_be_renamed() {
        let err = guard_rename(WALK_IN_CUSTOMER_NAME, "Bob").unwrap_err();
        assert!(matches!(err, LedgerError::ConflictingState(_)));
    }

    #[test]
    fn test_walk_in_keeps_its_name() {
        assert_eq!(
            guard_rename(WALK_IN_CUSTOMER_NAME, WALK_IN_CUSTOMER_NAME).unwrap(),
            WALK_IN_CUSTOMER_NAME
        );
    }

    #[test]
    fn test_reserved_name_cannot_be_taken() {
        assert!(matches!(
            guard_rename("Bob", WALK_IN_CUSTOMER_NAME),
            Err(LedgerError::ConflictingState(_))
        ));
    }

    #[test]
    fn test_regular_rename() {
        assert_eq!(guard_rename("Bob", " Alice ").unwrap(), "Alice");
        assert!(matches!(guard_rename("Bob", ""), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_guard_delete() {
        assert!(guard_delete(WALK_IN_CUSTOMER_NAME).is_err());
        assert!(guard_delete("Bob").is_ok());
    }
}
