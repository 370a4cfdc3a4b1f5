//! Per-clinic setup.

use tracing::info;

use super::customer::ensure_walk_in;
use crate::entities::customers;
use crate::error::RepoError;
use crate::tenant::TenantDb;

/// Repository for clinic-wide initialization.
#[derive(Debug, Clone)]
pub struct ClinicRepository {
    tenant: TenantDb,
}

impl ClinicRepository {
    /// Creates a new clinic repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Ensures the clinic's default records exist and returns the walk-in
    /// customer. Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Returns a database error if the customer cannot be read or created.
    pub async fn initialize(&self) -> Result<customers::Model, RepoError> {
        let walk_in = self
            .tenant
            .atomically(|txn| Box::pin(async move { ensure_walk_in(txn).await }))
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), customer_id = %walk_in.id, "Clinic initialized");
        Ok(walk_in)
    }
}
