//! Customer and customer payment routes.

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
use vetledger_db::entities::customers;
use vetledger_db::repositories::{CustomerRepository, CustomerWithPayments};

use super::MessageResponse;
use super::parties::{CreatePartyRequest, PaymentRequest, PaymentResponse, UpdatePartyRequest};
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/customers/{id}/payment", post(add_payment))
        .route(
            "/customers/{id}/payment/{payment_id}",
            put(update_payment).delete(delete_payment),
        )
}

/// Response for a customer and their payments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    /// Customer ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Address.
    pub address: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Sum of sale totals.
    pub total_sales: Decimal,
    /// Sum of treatment totals.
    pub total_treatments: Decimal,
    /// Sum of everything paid.
    pub total_paid: Decimal,
    /// Outstanding balance; negative means credit.
    pub total_rest: Decimal,
    /// Payments, oldest first. Empty when the customer was just created.
    pub payments: Vec<PaymentResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl CustomerResponse {
    fn new(customer: customers::Model, payments: Vec<PaymentResponse>) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            address: customer.address,
            phone: customer.phone,
            total_sales: customer.total_sales,
            total_treatments: customer.total_treatments,
            total_paid: customer.total_paid,
            total_rest: customer.total_rest,
            payments,
            created_at: customer.created_at,
        }
    }
}

impl From<CustomerWithPayments> for CustomerResponse {
    fn from(found: CustomerWithPayments) -> Self {
        let payments = found.payments.into_iter().map(Into::into).collect();
        Self::new(found.customer, payments)
    }
}

impl From<customers::Model> for CustomerResponse {
    fn from(customer: customers::Model) -> Self {
        Self::new(customer, Vec::new())
    }
}

/// GET `/customers` - List customers with their payments.
async fn list_customers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let customers = CustomerRepository::new(auth.tenant(&state)).list().await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// GET `/customers/{id}` - Get a customer with payments.
async fn get_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new(auth.tenant(&state)).get(id).await?;
    Ok(Json(customer.into()))
}

/// POST `/customers` - Create a customer with zero balances.
async fn create_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePartyRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let customer = CustomerRepository::new(auth.tenant(&state))
        .create(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// PUT `/customers/{id}` - Update contact details.
async fn update_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartyRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new(auth.tenant(&state))
        .update(id, payload.into())
        .await?;
    Ok(Json(customer.into()))
}

/// DELETE `/customers/{id}` - Delete a customer and their payments.
async fn delete_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    CustomerRepository::new(auth.tenant(&state)).delete(id).await?;
    Ok(Json(MessageResponse::deleted("Customer")))
}

/// POST `/customers/{id}/payment` - Record a payment from the customer.
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new(auth.tenant(&state))
        .add_payment(id, payload.into())
        .await?;
    Ok(Json(customer.into()))
}

/// PUT `/customers/{id}/payment/{payment_id}` - Edit a payment.
async fn update_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, payment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new(auth.tenant(&state))
        .update_payment(id, payment_id, payload.into())
        .await?;
    Ok(Json(customer.into()))
}

/// DELETE `/customers/{id}/payment/{payment_id}` - Remove a payment.
async fn delete_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = CustomerRepository::new(auth.tenant(&state))
        .delete_payment(id, payment_id)
        .await?;
    Ok(Json(customer.into()))
}
