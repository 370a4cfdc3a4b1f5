//! Purchase routes.

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
use vetledger_db::repositories::{PurchaseInput, PurchaseRepository, PurchaseView};

use super::{MessageResponse, Reference};
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the purchase routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", get(list_purchases).post(create_purchase))
        .route(
            "/purchases/{id}",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
}

/// Request body for creating or replacing a purchase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Product received.
    pub product: Uuid,
    /// Supplier the purchase is owed to.
    pub supplier: Uuid,
    /// Units received.
    pub quantity: i32,
    /// Unit cost.
    pub price: Decimal,
    /// Expiry of the received batch; overwrites the product's.
    pub expiry_date: Option<NaiveDate>,
    /// Purchase date (default today).
    pub date: Option<NaiveDate>,
}

impl From<PurchaseRequest> for PurchaseInput {
    fn from(req: PurchaseRequest) -> Self {
        Self {
            product_id: req.product,
            supplier_id: req.supplier,
            quantity: req.quantity,
            price: req.price,
            expiry_date: req.expiry_date,
            date: req.date,
        }
    }
}

/// Response for a purchase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    /// Purchase ID.
    pub id: Uuid,
    /// Product received.
    pub product: Reference,
    /// Supplier.
    pub supplier: Reference,
    /// Units received.
    pub quantity: i32,
    /// Unit cost.
    pub price: Decimal,
    /// `quantity * price`.
    pub total: Decimal,
    /// Batch expiry.
    pub expiry_date: Option<NaiveDate>,
    /// Purchase date.
    pub date: NaiveDate,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PurchaseView> for PurchaseResponse {
    fn from(view: PurchaseView) -> Self {
        let purchase = view.purchase;
        Self {
            id: purchase.id,
            product: Reference::new(purchase.product_id, view.product_name),
            supplier: Reference::new(purchase.supplier_id, view.supplier_name),
            quantity: purchase.quantity,
            price: purchase.price,
            total: purchase.total,
            expiry_date: purchase.expiry_date,
            date: purchase.date,
            created_at: purchase.created_at,
        }
    }
}

/// GET `/purchases` - List purchases, newest first.
async fn list_purchases(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PurchaseResponse>>, ApiError> {
    let purchases = PurchaseRepository::new(auth.tenant(&state)).list().await?;
    Ok(Json(purchases.into_iter().map(Into::into).collect()))
}

/// GET `/purchases/{id}` - Get a purchase.
async fn get_purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let purchase = PurchaseRepository::new(auth.tenant(&state)).get(id).await?;
    Ok(Json(purchase.into()))
}

/// POST `/purchases` - Record a purchase: adds stock and charges the supplier.
async fn create_purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let purchase = PurchaseRepository::new(auth.tenant(&state))
        .create(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(purchase.into())))
}

/// PUT `/purchases/{id}` - Replace a purchase.
async fn update_purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let purchase = PurchaseRepository::new(auth.tenant(&state))
        .update(id, payload.into())
        .await?;
    Ok(Json(purchase.into()))
}

/// DELETE `/purchases/{id}` - Delete a purchase. Fails when the received
/// units have already left the shelf.
async fn delete_purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    PurchaseRepository::new(auth.tenant(&state)).delete(id).await?;
    Ok(Json(MessageResponse::deleted("Purchase")))
}
