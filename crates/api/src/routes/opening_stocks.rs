//! Opening stock routes.

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
use vetledger_db::repositories::{OpeningStockInput, OpeningStockRepository, OpeningStockView};

use super::{MessageResponse, Reference};
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the opening stock routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/opening-stocks",
            get(list_opening_stocks).post(create_opening_stock),
        )
        .route(
            "/opening-stocks/{id}",
            get(get_opening_stock)
                .put(update_opening_stock)
                .delete(delete_opening_stock),
        )
}

/// Request body for creating or replacing an opening stock entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningStockRequest {
    /// Product counted.
    pub product: Uuid,
    /// Units found on the shelf.
    pub quantity: i32,
    /// Batch expiry; overwrites the product's.
    pub expiry_date: Option<NaiveDate>,
    /// Where the stock came from.
    pub source: String,
    /// Unit valuation.
    pub price: Option<Decimal>,
    /// Count date (default today).
    pub opening_date: Option<NaiveDate>,
}

impl From<OpeningStockRequest> for OpeningStockInput {
    fn from(req: OpeningStockRequest) -> Self {
        Self {
            product_id: req.product,
            quantity: req.quantity,
            expiry_date: req.expiry_date,
            source: req.source,
            price: req.price,
            opening_date: req.opening_date,
        }
    }
}

/// Response for an opening stock entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningStockResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Product counted.
    pub product: Reference,
    /// Units added.
    pub quantity: i32,
    /// Batch expiry.
    pub expiry_date: Option<NaiveDate>,
    /// Origin of the stock.
    pub source: String,
    /// Unit valuation.
    pub price: Option<Decimal>,
    /// Count date.
    pub opening_date: NaiveDate,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<OpeningStockView> for OpeningStockResponse {
    fn from(view: OpeningStockView) -> Self {
        let entry = view.opening_stock;
        Self {
            id: entry.id,
            product: Reference::new(entry.product_id, view.product_name),
            quantity: entry.quantity,
            expiry_date: entry.expiry_date,
            source: entry.source,
            price: entry.price,
            opening_date: entry.opening_date,
            created_at: entry.created_at,
        }
    }
}

/// GET `/opening-stocks` - List opening stock entries.
async fn list_opening_stocks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OpeningStockResponse>>, ApiError> {
    let entries = OpeningStockRepository::new(auth.tenant(&state))
        .list()
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// GET `/opening-stocks/{id}` - Get an entry.
async fn get_opening_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OpeningStockResponse>, ApiError> {
    let entry = OpeningStockRepository::new(auth.tenant(&state))
        .get(id)
        .await?;
    Ok(Json(entry.into()))
}

/// POST `/opening-stocks` - Record counted stock.
async fn create_opening_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OpeningStockRequest>,
) -> Result<(StatusCode, Json<OpeningStockResponse>), ApiError> {
    let entry = OpeningStockRepository::new(auth.tenant(&state))
        .create(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// PUT `/opening-stocks/{id}` - Replace an entry.
async fn update_opening_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpeningStockRequest>,
) -> Result<Json<OpeningStockResponse>, ApiError> {
    let entry = OpeningStockRepository::new(auth.tenant(&state))
        .update(id, payload.into())
        .await?;
    Ok(Json(entry.into()))
}

/// DELETE `/opening-stocks/{id}` - Delete an entry and remove its units.
async fn delete_opening_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    OpeningStockRepository::new(auth.tenant(&state))
        .delete(id)
        .await?;
    Ok(Json(MessageResponse::deleted("Opening stock")))
}
