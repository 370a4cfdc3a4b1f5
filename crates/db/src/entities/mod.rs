//! `SeaORM` entity definitions.
//!
//! Every table carries `clinic_id`; the `ClinicOwned` impls at the bottom of
//! each entity file are what the tenant handle uses to scope queries.

pub mod appointments;
pub mod consumed_products;
pub mod customer_payments;
pub mod customers;
pub mod opening_stocks;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod sea_orm_active_enums;
pub mod supplier_payments;
pub mod suppliers;
pub mod treatments;
