//! Sale routes.

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
use vetledger_db::repositories::{SaleInput, SaleRepository, SaleView};

use super::{MessageResponse, Reference};
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route(
            "/sales/{id}",
            get(get_sale).put(update_sale).delete(delete_sale),
        )
}

/// Request body for creating or replacing a sale.
#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    /// Product sold.
    pub product: Uuid,
    /// Buying customer; the walk-in customer when absent.
    pub customer: Option<Uuid>,
    /// Units sold.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
    /// Amount paid at the counter.
    #[serde(default)]
    pub paid: Decimal,
    /// Sale date (default today).
    pub date: Option<NaiveDate>,
}

impl From<SaleRequest> for SaleInput {
    fn from(req: SaleRequest) -> Self {
        Self {
            product_id: req.product,
            customer_id: req.customer,
            quantity: req.quantity,
            price: req.price,
            paid: req.paid,
            date: req.date,
        }
    }
}

/// Response for a sale.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    /// Sale ID.
    pub id: Uuid,
    /// Product sold.
    pub product: Reference,
    /// Buying customer.
    pub customer: Reference,
    /// Units sold.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
    /// `quantity * price`.
    pub total: Decimal,
    /// Amount paid.
    pub paid: Decimal,
    /// `total - paid`.
    pub rest: Decimal,
    /// Sale date.
    pub date: NaiveDate,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<SaleView> for SaleResponse {
    fn from(view: SaleView) -> Self {
        let sale = view.sale;
        Self {
            id: sale.id,
            product: Reference::new(sale.product_id, view.product_name),
            customer: Reference::new(sale.customer_id, view.customer_name),
            quantity: sale.quantity,
            price: sale.price,
            total: sale.total,
            paid: sale.paid,
            rest: sale.rest,
            date: sale.date,
            created_at: sale.created_at,
        }
    }
}

/// GET `/sales` - List sales, newest first.
async fn list_sales(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SaleResponse>>, ApiError> {
    let sales = SaleRepository::new(auth.tenant(&state)).list().await?;
    Ok(Json(sales.into_iter().map(Into::into).collect()))
}

/// GET `/sales/{id}` - Get a sale.
async fn get_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale = SaleRepository::new(auth.tenant(&state)).get(id).await?;
    Ok(Json(sale.into()))
}

/// POST `/sales` - Record a sale: takes stock and charges the customer.
async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), ApiError> {
    let sale = SaleRepository::new(auth.tenant(&state))
        .create(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(sale.into())))
}

/// PUT `/sales/{id}` - Replace a sale, moving its stock and balance effects.
async fn update_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaleRequest>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale = SaleRepository::new(auth.tenant(&state))
        .update(id, payload.into())
        .await?;
    Ok(Json(sale.into()))
}

/// DELETE `/sales/{id}` - Delete a sale, returning stock and uncharging.
async fn delete_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    SaleRepository::new(auth.tenant(&state)).delete(id).await?;
    Ok(Json(MessageResponse::deleted("Sale")))
}
