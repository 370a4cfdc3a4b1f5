//! Product routes.

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
use vetledger_db::entities::products;
use vetledger_db::repositories::{CreateProductInput, ProductRepository, UpdateProductInput};

use super::MessageResponse;
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Product name, unique per clinic.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Initial stock (default 0).
    pub quantity: Option<i32>,
    /// Low-stock threshold (default 5).
    pub min_limit: Option<i32>,
    /// Expiry date.
    pub expiry_date: Option<NaiveDate>,
}

/// Request body for updating a product. Absent fields are kept.
///
/// `quantity` is a manual stock correction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    /// New name.
    pub name: Option<String>,
    /// New unit price.
    pub price: Option<Decimal>,
    /// Corrected stock level.
    pub quantity: Option<i32>,
    /// New low-stock threshold.
    pub min_limit: Option<i32>,
    /// New expiry date; `null` clears it.
    #[serde(default, with = "double_option")]
    pub expiry_date: Option<Option<NaiveDate>>,
}

/// Response for a product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Product ID.
    pub id: Uuid,
    /// Product name.
    pub name: String,
    /// Units on hand.
    pub quantity: i32,
    /// Low-stock threshold.
    pub min_limit: i32,
    /// Unit price.
    pub price: Decimal,
    /// Expiry date of the most recently received batch.
    pub expiry_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for ProductResponse {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            quantity: model.quantity,
            min_limit: model.min_limit,
            price: model.price,
            expiry_date: model.expiry_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Distinguishes an absent field from an explicit `null`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// GET `/products` - List products by name.
async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = ProductRepository::new(auth.tenant(&state)).list().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET `/products/{id}` - Get a product.
async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = ProductRepository::new(auth.tenant(&state)).get(id).await?;
    Ok(Json(product.into()))
}

/// POST `/products` - Create a product.
async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = ProductRepository::new(auth.tenant(&state))
        .create(CreateProductInput {
            name: payload.name,
            price: payload.price,
            quantity: payload.quantity,
            min_limit: payload.min_limit,
            expiry_date: payload.expiry_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT `/products/{id}` - Update a product.
async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = ProductRepository::new(auth.tenant(&state))
        .update(
            id,
            UpdateProductInput {
                name: payload.name,
                price: payload.price,
                quantity: payload.quantity,
                min_limit: payload.min_limit,
                expiry_date: payload.expiry_date,
            },
        )
        .await?;
    Ok(Json(product.into()))
}

/// DELETE `/products/{id}` - Delete a product. Past transactions keep
/// referencing it and render it as `deleted`.
async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    ProductRepository::new(auth.tenant(&state)).delete(id).await?;
    Ok(Json(MessageResponse::deleted("Product")))
}
