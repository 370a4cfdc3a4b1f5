//! Treatment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vetledger_db::repositories::{TreatmentInput, TreatmentRepository, TreatmentView};

use super::{MessageResponse, Reference};
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the treatment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/treatments", get(list_treatments).post(create_treatment))
        .route(
            "/treatments/{id}",
            get(get_treatment)
                .put(update_treatment)
                .delete(delete_treatment),
        )
}

/// Request body for creating or replacing a treatment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRequest {
    /// Treated customer; the walk-in customer when absent.
    pub customer: Option<Uuid>,
    /// Treatment performed.
    pub treatment_name: String,
    /// Sessions or units billed.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
    /// Amount paid at the counter.
    #[serde(default)]
    pub paid: Decimal,
    /// Treatment date (default today).
    pub date: Option<NaiveDate>,
}

impl From<TreatmentRequest> for TreatmentInput {
    fn from(req: TreatmentRequest) -> Self {
        Self {
            customer_id: req.customer,
            treatment_name: req.treatment_name,
            quantity: req.quantity,
            price: req.price,
            paid: req.paid,
            date: req.date,
        }
    }
}

/// Response for a treatment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentResponse {
    /// Treatment ID.
    pub id: Uuid,
    /// Treated customer.
    pub customer: Reference,
    /// Treatment performed.
    pub treatment_name: String,
    /// Units billed.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
    /// `quantity * price`.
    pub total: Decimal,
    /// Amount paid.
    pub paid: Decimal,
    /// `total - paid`.
    pub rest: Decimal,
    /// Treatment date.
    pub date: NaiveDate,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<TreatmentView> for TreatmentResponse {
    fn from(view: TreatmentView) -> Self {
        let treatment = view.treatment;
        Self {
            id: treatment.id,
            customer: Reference::new(treatment.customer_id, view.customer_name),
            treatment_name: treatment.treatment_name,
            quantity: treatment.quantity,
            price: treatment.price,
            total: treatment.total,
            paid: treatment.paid,
            rest: treatment.rest,
            date: treatment.date,
            created_at: treatment.created_at,
        }
    }
}

/// GET `/treatments` - List treatments, newest first.
async fn list_treatments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TreatmentResponse>>, ApiError> {
    let treatments = TreatmentRepository::new(auth.tenant(&state)).list().await?;
    Ok(Json(treatments.into_iter().map(Into::into).collect()))
}

/// GET `/treatments/{id}` - Get a treatment.
async fn get_treatment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TreatmentResponse>, ApiError> {
    let treatment = TreatmentRepository::new(auth.tenant(&state)).get(id).await?;
    Ok(Json(treatment.into()))
}

/// POST `/treatments` - Record a treatment and charge the customer.
async fn create_treatment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TreatmentRequest>,
) -> Result<(StatusCode, Json<TreatmentResponse>), ApiError> {
    let treatment = TreatmentRepository::new(auth.tenant(&state))
        .create(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(treatment.into())))
}

/// PUT `/treatments/{id}` - Replace a treatment.
async fn update_treatment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TreatmentRequest>,
) -> Result<Json<TreatmentResponse>, ApiError> {
    let treatment = TreatmentRepository::new(auth.tenant(&state))
        .update(id, payload.into())
        .await?;
    Ok(Json(treatment.into()))
}

/// DELETE `/treatments/{id}` - Delete a treatment and uncharge the customer.
async fn delete_treatment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    TreatmentRepository::new(auth.tenant(&state)).delete(id).await?;
    Ok(Json(MessageResponse::deleted("Treatment")))
}
