//! Supplier and supplier payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use vetledger_db::entities::suppliers;
use vetledger_db::repositories::{SupplierRepository, SupplierWithPayments};

use super::MessageResponse;
use super::parties::{CreatePartyRequest, PaymentRequest, PaymentResponse, UpdatePartyRequest};
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the supplier routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/suppliers/{id}/payment", post(add_payment))
        .route(
            "/suppliers/{id}/payment/{payment_id}",
            put(update_payment).delete(delete_payment),
        )
}

/// Response for a supplier and the payments made to them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    /// Supplier ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Address.
    pub address: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Sum of purchase totals.
    pub total_purchases: Decimal,
    /// Sum of payments made to the supplier.
    pub total_paid: Decimal,
    /// Amount still owed; negative means prepaid.
    pub total_rest: Decimal,
    /// Payments, oldest first. Empty when the supplier was just created.
    pub payments: Vec<PaymentResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl SupplierResponse {
    fn new(supplier: suppliers::Model, payments: Vec<PaymentResponse>) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            address: supplier.address,
            phone: supplier.phone,
            total_purchases: supplier.total_purchases,
            total_paid: supplier.total_paid,
            total_rest: supplier.total_rest,
            payments,
            created_at: supplier.created_at,
        }
    }
}

impl From<SupplierWithPayments> for SupplierResponse {
    fn from(found: SupplierWithPayments) -> Self {
        let payments = found.payments.into_iter().map(Into::into).collect();
        Self::new(found.supplier, payments)
    }
}

impl From<suppliers::Model> for SupplierResponse {
    fn from(supplier: suppliers::Model) -> Self {
        Self::new(supplier, Vec::new())
    }
}

/// GET `/suppliers` - List suppliers with their payments.
async fn list_suppliers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SupplierResponse>>, ApiError> {
    let suppliers = SupplierRepository::new(auth.tenant(&state)).list().await?;
    Ok(Json(suppliers.into_iter().map(Into::into).collect()))
}

/// GET `/suppliers/{id}` - Get a supplier with payments.
async fn get_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier = SupplierRepository::new(auth.tenant(&state)).get(id).await?;
    Ok(Json(supplier.into()))
}

/// POST `/suppliers` - Create a supplier with zero balances.
async fn create_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePartyRequest>,
) -> Result<(StatusCode, Json<SupplierResponse>), ApiError> {
    let supplier = SupplierRepository::new(auth.tenant(&state))
        .create(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(supplier.into())))
}

/// PUT `/suppliers/{id}` - Update contact details.
async fn update_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartyRequest>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier = SupplierRepository::new(auth.tenant(&state))
        .update(id, payload.into())
        .await?;
    Ok(Json(supplier.into()))
}

/// DELETE `/suppliers/{id}` - Delete a supplier and their payments.
async fn delete_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    SupplierRepository::new(auth.tenant(&state)).delete(id).await?;
    Ok(Json(MessageResponse::deleted("Supplier")))
}

/// POST `/suppliers/{id}/payment` - Record a payment made to the supplier.
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier = SupplierRepository::new(auth.tenant(&state))
        .add_payment(id, payload.into())
        .await?;
    Ok(Json(supplier.into()))
}

/// PUT `/suppliers/{id}/payment/{payment_id}` - Edit a payment.
async fn update_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, payment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier = SupplierRepository::new(auth.tenant(&state))
        .update_payment(id, payment_id, payload.into())
        .await?;
    Ok(Json(supplier.into()))
}

/// DELETE `/suppliers/{id}/payment/{payment_id}` - Remove a payment.
async fn delete_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier = SupplierRepository::new(auth.tenant(&state))
        .delete_payment(id, payment_id)
        .await?;
    Ok(Json(supplier.into()))
}
