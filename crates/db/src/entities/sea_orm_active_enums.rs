//! `SeaORM` active enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use vetledger_core::appointment::AppointmentStatus as DomainStatus;

/// Stored appointment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AppointmentStatus {
    /// Booked, not yet confirmed.
    #[sea_orm(string_value = "Scheduled")]
    Scheduled,
    /// Confirmed with the customer.
    #[sea_orm(string_value = "Confirmed")]
    Confirmed,
    /// Called off.
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    /// Took place.
    #[sea_orm(string_value = "Completed")]
    Completed,
}

impl From<DomainStatus> for AppointmentStatus {
    fn from(status: DomainStatus) -> Self {
        match status {
            DomainStatus::Scheduled => Self::Scheduled,
            DomainStatus::Confirmed => Self::Confirmed,
            DomainStatus::Cancelled => Self::Cancelled,
            DomainStatus::Completed => Self::Completed,
        }
    }
}

impl From<AppointmentStatus> for DomainStatus {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Scheduled => Self::Scheduled,
            AppointmentStatus::Confirmed => Self::Confirmed,
            AppointmentStatus::Cancelled => Self::Cancelled,
            AppointmentStatus::Completed => Self::Completed,
        }
    }
}
