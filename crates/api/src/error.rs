//! Error responses.
//!
//! Every failure leaves a handler as `{"error": CODE, "message": text}` with
//! the status chosen by [`AppError::status_code`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;
use vetledger_core::ledger::LedgerError;
use vetledger_db::RepoError;
use vetledger_shared::AppError;

/// Handler error, rendered as the JSON error envelope.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Shorthand for a 400 with `message`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        Self(err.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status == StatusCode::CONFLICT {
            warn!(error = %self.0, "Request rejected with conflict");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.public_message(),
            })),
        )
            .into_response()
    }
}
