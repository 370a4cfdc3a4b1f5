//! Dashboard and analysis routes.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;
use vetledger_core::analytics::{AnalysisReport, DashboardStats};
use vetledger_db::repositories::{AnalyticsRepository, Dashboard};

use super::products::ProductResponse;
use super::purchases::PurchaseResponse;
use super::sales::SaleResponse;
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/analysis", get(get_analysis))
}

/// Products that need attention.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warnings {
    /// At or below their minimum limit, lowest first.
    pub low_stock: Vec<ProductResponse>,
    /// Expiring within 30 days, soonest first.
    pub expiring: Vec<ProductResponse>,
}

/// Latest activity.
#[derive(Debug, Serialize)]
pub struct Recent {
    /// Newest sales.
    pub sales: Vec<SaleResponse>,
    /// Newest purchases.
    pub purchases: Vec<PurchaseResponse>,
}

/// `GET /dashboard` payload.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Headline totals.
    pub stats: DashboardStats,
    /// Stock warnings.
    pub warnings: Warnings,
    /// Latest activity.
    pub recent: Recent,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            stats: dashboard.stats,
            warnings: Warnings {
                low_stock: dashboard.low_stock.into_iter().map(Into::into).collect(),
                expiring: dashboard.expiring.into_iter().map(Into::into).collect(),
            },
            recent: Recent {
                sales: dashboard.recent_sales.into_iter().map(Into::into).collect(),
                purchases: dashboard
                    .recent_purchases
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            },
        }
    }
}

/// GET `/dashboard` - Totals, stock warnings and latest activity.
async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let dashboard = AnalyticsRepository::new(auth.tenant(&state))
        .dashboard(Utc::now().date_naive())
        .await?;
    Ok(Json(dashboard.into()))
}

/// GET `/analysis` - Six-month series and top rankings.
async fn get_analysis(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AnalysisReport>, ApiError> {
    let report = AnalyticsRepository::new(auth.tenant(&state))
        .analysis(Utc::now().date_naive())
        .await?;
    Ok(Json(report))
}
