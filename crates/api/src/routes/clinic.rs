//! Clinic setup route.

use axum::{Json, Router, extract::State, routing::post};
use vetledger_db::repositories::ClinicRepository;

use super::customers::CustomerResponse;
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the clinic routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/clinic/setup", post(setup_clinic))
}

/// POST `/clinic/setup` - Ensure the clinic's walk-in customer exists and
/// return it. Safe to call repeatedly.
async fn setup_clinic(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CustomerResponse>, ApiError> {
    let walk_in = ClinicRepository::new(auth.tenant(&state))
        .initialize()
        .await?;
    Ok(Json(walk_in.into()))
}
