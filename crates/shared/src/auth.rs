//! Authentication principal carried in access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ClinicId;

/// JWT claims for access tokens.
///
/// Field names follow the wire format issued to existing clients
/// (`id`, `role`, `clinicId`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user ID.
    #[serde(rename = "id")]
    pub sub: Uuid,
    /// Clinic (tenant) the user belongs to.
    #[serde(rename = "clinicId")]
    pub clinic: ClinicId,
    /// User's role in the clinic (`admin` or `staff`).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, clinic_id: ClinicId, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            clinic: clinic_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the clinic the principal is scoped to.
    #[must_use]
    pub const fn clinic_id(&self) -> ClinicId {
        self.clinic
    }
}
