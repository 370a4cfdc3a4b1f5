//! Shared fixtures for database integration tests.
//!
//! Each test gets its own in-memory SQLite database with the schema applied.
//! The pool holds a single connection so the database lives as long as the
//! test.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use vetledger_db::entities::{customers, products, suppliers};
use vetledger_db::migration::{Migrator, MigratorTrait};
use vetledger_db::repositories::{
    CreatePartyInput, CreateProductInput, CustomerRepository, ProductRepository,
    SupplierRepository,
};
use vetledger_db::TenantDb;
use vetledger_shared::types::ClinicId;

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open SQLite database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// A fresh clinic bound to `db`.
pub fn new_clinic(db: &DatabaseConnection) -> TenantDb {
    TenantDb::new(db.clone(), ClinicId::new())
}

pub async fn create_product(tenant: &TenantDb, name: &str, quantity: i32, price: Decimal) -> products::Model {
    ProductRepository::new(tenant.clone())
        .create(CreateProductInput {
            name: name.to_string(),
            price,
            quantity: Some(quantity),
            min_limit: None,
            expiry_date: None,
        })
        .await
        .expect("Failed to create product")
}

pub async fn create_customer(tenant: &TenantDb, name: &str) -> customers::Model {
    CustomerRepository::new(tenant.clone())
        .create(party(name))
        .await
        .expect("Failed to create customer")
}

pub async fn create_supplier(tenant: &TenantDb, name: &str) -> suppliers::Model {
    SupplierRepository::new(tenant.clone())
        .create(party(name))
        .await
        .expect("Failed to create supplier")
}

pub fn party(name: &str) -> CreatePartyInput {
    CreatePartyInput {
        name: name.to_string(),
        address: None,
        phone: None,
    }
}

pub async fn product_quantity(tenant: &TenantDb, id: uuid::Uuid) -> i32 {
    ProductRepository::new(tenant.clone())
        .get(id)
        .await
        .expect("Product should exist")
        .quantity
}

pub async fn customer_state(tenant: &TenantDb, id: uuid::Uuid) -> customers::Model {
    CustomerRepository::new(tenant.clone())
        .get(id)
        .await
        .expect("Customer should exist")
        .customer
}

pub async fn supplier_state(tenant: &TenantDb, id: uuid::Uuid) -> suppliers::Model {
    SupplierRepository::new(tenant.clone())
        .get(id)
        .await
        .expect("Supplier should exist")
        .supplier
}
