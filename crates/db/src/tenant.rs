//! Clinic-scoped database access.
//!
//! Repositories never see a bare connection. They are built from a
//! [`TenantDb`], which pairs the pool with the `ClinicId` taken from verified
//! claims, and every lookup, update and delete by id goes through the
//! `(id, clinic_id)` filter below. A record owned by another clinic is
//! therefore indistinguishable from a missing one.
//!
//! # Usage
//!
//! ```ignore
//! use vetledger_db::tenant::TenantDb;
//!
//! let tenant = TenantDb::new(db, claims.clinic_id());
//! let sale = tenant
//!     .atomically(|txn| Box::pin(async move { create_sale_in(txn, &input).await }))
//!     .await?;
//! ```

use futures::future::BoxFuture;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Select, TransactionTrait,
};
use tracing::{error, warn};
use uuid::Uuid;
use vetledger_shared::types::ClinicId;

use crate::error::RepoError;

/// An entity partitioned by clinic.
pub trait ClinicOwned: EntityTrait {
    /// Primary key column.
    fn id_column() -> Self::Column;
    /// Tenant partition column.
    fn clinic_column() -> Self::Column;
}

/// An entity with a display name, used to resolve references in listings.
pub trait Named: ClinicOwned {
    /// Name column.
    fn name_column() -> Self::Column;
}

/// Implements [`ClinicOwned`] (and optionally [`Named`]) for an entity whose
/// columns are called `Id`, `ClinicId` and `Name`.
macro_rules! clinic_owned {
    ($entity:ty, named) => {
        $crate::tenant::clinic_owned!($entity);

        impl $crate::tenant::Named for $entity {
            fn name_column() -> Column {
                Column::Name
            }
        }
    };
    ($entity:ty) => {
        impl $crate::tenant::ClinicOwned for $entity {
            fn id_column() -> Column {
                Column::Id
            }

            fn clinic_column() -> Column {
                Column::ClinicId
            }
        }
    };
}
pub(crate) use clinic_owned;

fn scoped<E: ClinicOwned>(clinic_id: ClinicId) -> Select<E> {
    E::find().filter(E::clinic_column().eq(clinic_id.into_inner()))
}

async fn find_scoped<E, C>(conn: &C, clinic_id: ClinicId, id: Uuid) -> Result<Option<E::Model>, DbErr>
where
    E: ClinicOwned,
    C: ConnectionTrait,
{
    scoped::<E>(clinic_id)
        .filter(E::id_column().eq(id))
        .one(conn)
        .await
}

async fn delete_scoped<E, C>(conn: &C, clinic_id: ClinicId, id: Uuid) -> Result<bool, DbErr>
where
    E: ClinicOwned,
    C: ConnectionTrait,
{
    let result = E::delete_many()
        .filter(E::id_column().eq(id))
        .filter(E::clinic_column().eq(clinic_id.into_inner()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Default number of attempts for an operation that keeps losing
/// optimistic-lock races.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A connection pool bound to one clinic.
#[derive(Debug, Clone)]
pub struct TenantDb {
    db: DatabaseConnection,
    clinic_id: ClinicId,
    max_attempts: u32,
}

impl TenantDb {
    /// Binds `db` to `clinic_id`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, clinic_id: ClinicId) -> Self {
        Self {
            db,
            clinic_id,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides how many times [`Self::atomically`] runs a conflicting
    /// operation. Values below one are treated as one.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// The clinic every query is scoped to.
    #[must_use]
    pub const fn clinic_id(&self) -> ClinicId {
        self.clinic_id
    }

    pub(crate) const fn conn(&self) -> &DatabaseConnection {
        &self.db
    }

    /// All rows of `E` in this clinic.
    #[must_use]
    pub fn select<E: ClinicOwned>(&self) -> Select<E> {
        scoped::<E>(self.clinic_id)
    }

    /// Looks up a row by id within this clinic.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find<E: ClinicOwned>(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        find_scoped::<E, _>(&self.db, self.clinic_id, id).await
    }

    /// Deletes a row by id within this clinic. Returns false if nothing
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub async fn delete<E: ClinicOwned>(&self, id: Uuid) -> Result<bool, DbErr> {
        delete_scoped::<E, _>(&self.db, self.clinic_id, id).await
    }

    /// Runs `op` inside one database transaction.
    ///
    /// The transaction commits when `op` succeeds and rolls back on any
    /// error. An operation that fails with a retryable error (a lost
    /// optimistic-lock race) is run again from the start, up to the
    /// configured number of attempts.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt, or a database error if the
    /// transaction cannot be started or committed.
    pub async fn atomically<T, F>(&self, op: F) -> Result<T, RepoError>
    where
        T: Send,
        F: for<'t> Fn(&'t TenantTxn) -> BoxFuture<'t, Result<T, RepoError>> + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let txn = TenantTxn {
                txn: self.db.begin().await?,
                clinic_id: self.clinic_id,
            };

            let outcome = op(&txn).await;
            match outcome {
                Ok(value) => {
                    txn.txn.commit().await?;
                    return Ok(value);
                }
                Err(err) => {
                    if let Err(rollback_err) = txn.txn.rollback().await {
                        error!(clinic_id = %self.clinic_id, error = %rollback_err, "Rollback failed");
                    }
                    if err.is_retryable() && attempt < self.max_attempts {
                        warn!(
                            clinic_id = %self.clinic_id,
                            attempt,
                            error = %err,
                            "Optimistic lock conflict, retrying operation"
                        );
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

/// A database transaction bound to one clinic.
pub struct TenantTxn {
    txn: DatabaseTransaction,
    clinic_id: ClinicId,
}

impl TenantTxn {
    /// The clinic every query is scoped to.
    #[must_use]
    pub const fn clinic_id(&self) -> ClinicId {
        self.clinic_id
    }

    pub(crate) const fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// All rows of `E` in this clinic.
    #[must_use]
    pub fn select<E: ClinicOwned>(&self) -> Select<E> {
        scoped::<E>(self.clinic_id)
    }

    /// Looks up a row by id within this clinic.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find<E: ClinicOwned>(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        find_scoped::<E, _>(&self.txn, self.clinic_id, id).await
    }

    /// Deletes a row by id within this clinic. Returns false if nothing
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub async fn delete<E: ClinicOwned>(&self, id: Uuid) -> Result<bool, DbErr> {
        delete_scoped::<E, _>(&self.txn, self.clinic_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::Utc;
    use rust_decimal::Decimal;
    use sea_orm::{ActiveModelTrait, ConnectOptions, Database, PaginatorTrait, Set};
    use sea_orm_migration::MigratorTrait;
    use vetledger_core::ledger::LedgerError;

    use super::*;
    use crate::entities::products;
    use crate::migration::Migrator;

    async fn setup() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn insert_product(txn: &TenantTxn, name: &str) -> Result<Uuid, RepoError> {
        let now = Utc::now();
        let product = products::ActiveModel {
            id: Set(Uuid::now_v7()),
            clinic_id: Set(txn.clinic_id().into_inner()),
            name: Set(name.to_string()),
            quantity: Set(0),
            min_limit: Set(5),
            price: Set(Decimal::ONE),
            expiry_date: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn.conn())
        .await?;
        Ok(product.id)
    }

    #[tokio::test]
    async fn test_conflict_is_retried_and_failed_attempt_rolled_back() {
        let db = setup().await;
        let tenant = TenantDb::new(db, ClinicId::new());
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&attempts);
        let id = tenant
            .atomically(move |txn| {
                let counter = Arc::clone(&counter);
                Box::pin(async move {
                    let id = insert_product(txn, "Retried").await?;
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        return Err(LedgerError::ConcurrentModification(id).into());
                    }
                    Ok(id)
                })
            })
            .await
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        let count = tenant.select::<products::Entity>().count(tenant.conn()).await.unwrap();
        assert_eq!(count, 1);
        assert!(tenant.find::<products::Entity>(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_conflict_surfaces_after_last_attempt() {
        let db = setup().await;
        let tenant = TenantDb::new(db, ClinicId::new()).with_max_attempts(2);
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&attempts);
        let result: Result<(), RepoError> = tenant
            .atomically(move |txn| {
                let counter = Arc::clone(&counter);
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let id = insert_product(txn, "Never kept").await?;
                    Err(LedgerError::ConcurrentModification(id).into())
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Ledger(LedgerError::ConcurrentModification(_)))
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        let count = tenant.select::<products::Entity>().count(tenant.conn()).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let db = setup().await;
        let tenant = TenantDb::new(db, ClinicId::new());
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&attempts);
        let result: Result<(), RepoError> = tenant
            .atomically(move |_txn| {
                let counter = Arc::clone(&counter);
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LedgerError::validation("bad input").into())
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scoped_lookups_ignore_other_clinics() {
        let db = setup().await;
        let owner = TenantDb::new(db.clone(), ClinicId::new());
        let stranger = TenantDb::new(db, ClinicId::new());

        let id = owner
            .atomically(|txn| Box::pin(async move { insert_product(txn, "Private").await }))
            .await
            .unwrap();

        assert!(stranger.find::<products::Entity>(id).await.unwrap().is_none());
        assert!(!stranger.delete::<products::Entity>(id).await.unwrap());
        assert!(owner.delete::<products::Entity>(id).await.unwrap());
    }
}
