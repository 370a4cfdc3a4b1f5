//! Consumed product routes: stock used in-house, never billed.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vetledger_db::repositories::{
    ConsumedProductInput, ConsumedProductRepository, ConsumedProductView,
};

use super::{MessageResponse, Reference};
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the consumed product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/consumed-products",
            get(list_consumed).post(create_consumed),
        )
        .route(
            "/consumed-products/{id}",
            get(get_consumed).put(update_consumed).delete(delete_consumed),
        )
}

/// Request body for creating or replacing a consumption.
#[derive(Debug, Deserialize)]
pub struct ConsumedProductRequest {
    /// Product used.
    pub product: Uuid,
    /// Units used.
    pub quantity: i32,
    /// What it was used for.
    pub notes: Option<String>,
    /// Consumption date (default today).
    pub date: Option<NaiveDate>,
}

impl From<ConsumedProductRequest> for ConsumedProductInput {
    fn from(req: ConsumedProductRequest) -> Self {
        Self {
            product_id: req.product,
            quantity: req.quantity,
            notes: req.notes,
            date: req.date,
        }
    }
}

/// Response for a consumption.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedProductResponse {
    /// Record ID.
    pub id: Uuid,
    /// Product used.
    pub product: Reference,
    /// Units used.
    pub quantity: i32,
    /// Note.
    pub notes: Option<String>,
    /// Consumption date.
    pub date: NaiveDate,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<ConsumedProductView> for ConsumedProductResponse {
    fn from(view: ConsumedProductView) -> Self {
        let consumed = view.consumed;
        Self {
            id: consumed.id,
            product: Reference::new(consumed.product_id, view.product_name),
            quantity: consumed.quantity,
            notes: consumed.notes,
            date: consumed.date,
            created_at: consumed.created_at,
        }
    }
}

/// GET `/consumed-products` - List consumptions.
async fn list_consumed(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ConsumedProductResponse>>, ApiError> {
    let consumed = ConsumedProductRepository::new(auth.tenant(&state))
        .list()
        .await?;
    Ok(Json(consumed.into_iter().map(Into::into).collect()))
}

/// GET `/consumed-products/{id}` - Get a consumption.
async fn get_consumed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsumedProductResponse>, ApiError> {
    let consumed = ConsumedProductRepository::new(auth.tenant(&state))
        .get(id)
        .await?;
    Ok(Json(consumed.into()))
}

/// POST `/consumed-products` - Take stock for in-house use.
async fn create_consumed(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ConsumedProductRequest>,
) -> Result<(StatusCode, Json<ConsumedProductResponse>), ApiError> {
    let consumed = ConsumedProductRepository::new(auth.tenant(&state))
        .create(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(consumed.into())))
}

/// PUT `/consumed-products/{id}` - Replace a consumption.
async fn update_consumed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConsumedProductRequest>,
) -> Result<Json<ConsumedProductResponse>, ApiError> {
    let consumed = ConsumedProductRepository::new(auth.tenant(&state))
        .update(id, payload.into())
        .await?;
    Ok(Json(consumed.into()))
}

/// DELETE `/consumed-products/{id}` - Delete a consumption and restock.
async fn delete_consumed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    ConsumedProductRepository::new(auth.tenant(&state))
        .delete(id)
        .await?;
    Ok(Json(MessageResponse::deleted("Consumed product")))
}
