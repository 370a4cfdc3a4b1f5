//! Core business logic for Vetledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Stock and party-balance arithmetic, transaction amounts, errors
//! - `customer` - Walk-in customer rules
//! - `appointment` - Appointment status and scheduling rules
//! - `analytics` - Read-only dashboard and analysis rollups

pub mod analytics;
pub mod appointment;
pub mod customer;
pub mod ledger;

/// Placeholder rendered in listings when a referenced product or party was deleted.
pub const DELETED_REFERENCE: &str = "deleted";
