//! Read-only rollups over sales, purchases and treatments.
//!
//! This module provides pure aggregation logic for:
//! - Monthly sales / purchases / profit series
//! - Top product and treatment rankings
//! - Dashboard stock warnings

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::AnalyticsService;
pub use types::*;
