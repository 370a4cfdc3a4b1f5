//! API route definitions.

use axum::{Router, middleware};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod analytics;
pub mod appointments;
pub mod clinic;
pub mod consumed_products;
pub mod customers;
pub mod health;
pub mod opening_stocks;
mod parties;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod suppliers;
pub mod treatments;

/// Creates the API router; everything but `/health` requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(clinic::routes())
        .merge(products::routes())
        .merge(customers::routes())
        .merge(suppliers::routes())
        .merge(sales::routes())
        .merge(purchases::routes())
        .merge(treatments::routes())
        .merge(opening_stocks::routes())
        .merge(consumed_products::routes())
        .merge(appointments::routes())
        .merge(analytics::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// A referenced product or party, rendered with its current name.
#[derive(Debug, Serialize)]
pub struct Reference {
    /// Referenced record ID.
    pub id: Uuid,
    /// Current name, or `deleted`.
    pub name: String,
}

impl Reference {
    fn new(id: Uuid, name: String) -> Self {
        Self { id, name }
    }
}

/// Body returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    fn deleted(what: &str) -> Self {
        Self {
            message: format!("{what} deleted successfully"),
        }
    }
}
