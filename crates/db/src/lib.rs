//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The clinic-scoped [`TenantDb`] handle every repository is built from
//! - Repositories for master data, ledger operations and analytics
//! - Database migrations

pub mod entities;
pub mod error;
pub mod migration;
mod postings;
pub mod repositories;
pub mod tenant;

pub use error::RepoError;
pub use repositories::{
    AnalyticsRepository, AppointmentRepository, ClinicRepository, ConsumedProductRepository,
    CustomerRepository, OpeningStockRepository, ProductRepository, PurchaseRepository,
    SaleRepository, SupplierRepository, TreatmentRepository,
};
pub use tenant::{TenantDb, TenantTxn};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;
use vetledger_shared::config::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    info!(max_connections = config.max_connections, "Connecting to database");
    Database::connect(options).await
}
