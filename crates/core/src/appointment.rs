//! Appointment status and scheduling rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Booked, not yet confirmed.
    #[default]
    Scheduled,
    /// Confirmed with the customer.
    Confirmed,
    /// Called off.
    Cancelled,
    /// Took place.
    Completed,
}

impl AppointmentStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(Self::Scheduled),
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            "Completed" => Ok(Self::Completed),
            other => Err(LedgerError::validation(format!(
                "Invalid appointment status: {other}"
            ))),
        }
    }
}

/// Checks that an appointment ends after it starts.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when `end_time <= start`.
pub fn validate_window(start: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<(), LedgerError> {
    if end_time <= start {
        return Err(LedgerError::validation(
            "Appointment end time must be after its start",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_parse_and_display() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(status.to_string().parse::<AppointmentStatus>().unwrap(), status);
        }
        assert!("Pending".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_default_status_is_scheduled() {
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Scheduled);
    }

    #[test]
    fn test_validate_window() {
        let start = Utc::now();
        assert!(validate_window(start, start + Duration::minutes(30)).is_ok());
        assert!(validate_window(start, start).is_err());
        assert!(validate_window(start, start - Duration::minutes(1)).is_err());
    }
}
