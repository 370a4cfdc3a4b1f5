//! Appointment routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vetledger_core::appointment::AppointmentStatus;
use vetledger_db::entities::sea_orm_active_enums::AppointmentStatus as StoredStatus;
use vetledger_db::repositories::{
    AppointmentRange, AppointmentRepository, AppointmentView, CreateAppointmentInput,
    UpdateAppointmentInput,
};

use super::MessageResponse;
use super::products::double_option;
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the appointment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
}

/// Query parameters for listing appointments.
#[derive(Debug, Deserialize)]
pub struct ListAppointmentsQuery {
    /// Earliest start, RFC 3339 or `YYYY-MM-DD` (inclusive).
    pub start: Option<String>,
    /// Latest start, RFC 3339 or `YYYY-MM-DD` (inclusive).
    pub end: Option<String>,
}

/// Request body for booking an appointment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    /// Customer being seen.
    pub customer: Uuid,
    /// Start of the slot.
    pub date: DateTime<Utc>,
    /// End of the slot; must be after `date`.
    pub end_time: DateTime<Utc>,
    /// Service booked.
    pub service_type: String,
    /// Initial status (default `Scheduled`).
    pub status: Option<String>,
    /// Free-form note.
    pub notes: Option<String>,
}

/// Request body for updating an appointment. Absent fields are kept.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    /// New customer.
    pub customer: Option<Uuid>,
    /// New start.
    pub date: Option<DateTime<Utc>>,
    /// New end.
    pub end_time: Option<DateTime<Utc>>,
    /// New service.
    pub service_type: Option<String>,
    /// New status.
    pub status: Option<String>,
    /// New note; `null` clears it.
    #[serde(default, with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Customer summary embedded in an appointment.
#[derive(Debug, Serialize)]
pub struct AppointmentCustomer {
    /// Customer ID.
    pub id: Uuid,
    /// Current name, or `deleted`.
    pub name: String,
    /// Contact phone.
    pub phone: Option<String>,
}

/// Response for an appointment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    /// Appointment ID.
    pub id: Uuid,
    /// Customer being seen.
    pub customer: AppointmentCustomer,
    /// Start of the slot.
    pub date: DateTime<Utc>,
    /// End of the slot.
    pub end_time: DateTime<Utc>,
    /// Service booked.
    pub service_type: String,
    /// Lifecycle status.
    pub status: StoredStatus,
    /// Note.
    pub notes: Option<String>,
    /// Booking timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<AppointmentView> for AppointmentResponse {
    fn from(view: AppointmentView) -> Self {
        let appointment = view.appointment;
        Self {
            id: appointment.id,
            customer: AppointmentCustomer {
                id: appointment.customer_id,
                name: view.customer_name,
                phone: view.customer_phone,
            },
            date: appointment.date,
            end_time: appointment.end_time,
            service_type: appointment.service_type,
            status: appointment.status,
            notes: appointment.notes,
            created_at: appointment.created_at,
        }
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<AppointmentStatus>, ApiError> {
    raw.map(AppointmentStatus::from_str)
        .transpose()
        .map_err(Into::into)
}

/// Parses a range bound given either as an instant or as a calendar day.
fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or_else(|| ApiError::validation(format!("Invalid {name} date: {raw}")))
}

/// GET `/appointments` - List appointments by start time, optionally
/// limited to `[start, end]`.
async fn list_appointments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    let range = AppointmentRange {
        start: parse_bound(query.start.as_deref(), "start")?,
        end: parse_bound(query.end.as_deref(), "end")?,
    };
    let appointments = AppointmentRepository::new(auth.tenant(&state))
        .list(range)
        .await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// GET `/appointments/{id}` - Get an appointment.
async fn get_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let appointment = AppointmentRepository::new(auth.tenant(&state))
        .get(id)
        .await?;
    Ok(Json(appointment.into()))
}

/// POST `/appointments` - Book an appointment.
async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), ApiError> {
    let status = parse_status(payload.status.as_deref())?;
    let appointment = AppointmentRepository::new(auth.tenant(&state))
        .create(CreateAppointmentInput {
            customer_id: payload.customer,
            date: payload.date,
            end_time: payload.end_time,
            service_type: payload.service_type,
            status,
            notes: payload.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// PUT `/appointments/{id}` - Reschedule, reassign or change status.
async fn update_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let status = parse_status(payload.status.as_deref())?;
    let appointment = AppointmentRepository::new(auth.tenant(&state))
        .update(
            id,
            UpdateAppointmentInput {
                customer_id: payload.customer,
                date: payload.date,
                end_time: payload.end_time,
                service_type: payload.service_type,
                status,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(appointment.into()))
}

/// DELETE `/appointments/{id}` - Cancel and remove an appointment.
async fn delete_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    AppointmentRepository::new(auth.tenant(&state))
        .delete(id)
        .await?;
    Ok(Json(MessageResponse::deleted("Appointment")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_bound_accepts_instant_and_day() {
        assert_eq!(
            parse_bound(Some("2026-05-04T09:30:00Z"), "start").unwrap(),
            Some(Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap())
        );
        assert_eq!(
            parse_bound(Some("2026-05-04"), "start").unwrap(),
            Some(Utc.with_ymd_and_hms(2026, 5, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_bound(Some(" "), "end").unwrap(), None);
        assert!(parse_bound(Some("next week"), "end").is_err());
    }

    #[test]
    fn test_parse_status_rejects_unknown_values() {
        assert_eq!(
            parse_status(Some("Confirmed")).unwrap(),
            Some(AppointmentStatus::Confirmed)
        );
        assert!(parse_status(Some("Lost")).is_err());
    }
}
