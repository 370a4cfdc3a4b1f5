//! Repository error type.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::error;
use vetledger_core::ledger::LedgerError;
use vetledger_shared::AppError;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepoError {
    /// Returns true if re-running the whole operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            Self::Database(_) => false,
        }
    }

    /// Returns the domain error, if this is one.
    #[must_use]
    pub const fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}

/// Maps a unique-constraint violation to `ConflictingState` with `message`.
pub(crate) fn conflict_on_duplicate(err: DbErr, message: &str) -> RepoError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return LedgerError::ConflictingState(message.to_string()).into();
    }
    err.into()
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Ledger(err) => err.into(),
            RepoError::Database(err) => {
                error!(error = %err, "Database error");
                Self::Database(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vetledger_core::ledger::EntityKind;

    #[test]
    fn test_retryable_only_for_concurrent_modification() {
        assert!(RepoError::from(LedgerError::ConcurrentModification(Uuid::nil())).is_retryable());
        assert!(!RepoError::from(LedgerError::NotFound(EntityKind::Sale)).is_retryable());
        assert!(!RepoError::from(DbErr::Custom("boom".into())).is_retryable());
    }

    #[test]
    fn test_database_errors_become_generic_500() {
        let app: AppError = RepoError::from(DbErr::Custom("connection reset".into())).into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.public_message(), "An error occurred");
    }

    #[test]
    fn test_ledger_errors_keep_their_status() {
        let app: AppError = RepoError::from(LedgerError::NotFound(EntityKind::Customer)).into();
        assert_eq!(app.status_code(), 404);
        assert_eq!(app.public_message(), "Customer not found");
    }

    #[test]
    fn test_non_unique_errors_pass_through() {
        let err = conflict_on_duplicate(DbErr::Custom("other".into()), "duplicate");
        assert!(matches!(err, RepoError::Database(_)));
    }
}
