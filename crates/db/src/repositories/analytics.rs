//! Read-only rollups for the dashboard and analysis screens.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;
use vetledger_core::analytics::service::{RECENT_LIMIT, WARNING_LIMIT};
use vetledger_core::analytics::{AnalysisReport, AnalyticsService, DashboardStats};

use super::party::names_of;
use super::purchase::{PurchaseView, purchase_views};
use super::sale::{SaleView, sale_views};
use crate::entities::{products, purchases, sales, treatments};
use crate::error::RepoError;
use crate::tenant::TenantDb;

/// Dashboard payload.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Headline numbers.
    pub stats: DashboardStats,
    /// Products at or below their minimum, lowest stock first.
    pub low_stock: Vec<products::Model>,
    /// Products expiring within the warning window, soonest first.
    pub expiring: Vec<products::Model>,
    /// Latest sales.
    pub recent_sales: Vec<SaleView>,
    /// Latest purchases.
    pub recent_purchases: Vec<PurchaseView>,
}

/// Repository for analytics reads.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    tenant: TenantDb,
}

impl AnalyticsRepository {
    /// Creates a new analytics repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Builds the dashboard as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard, RepoError> {
        let conn = self.tenant.conn();
        let all_products = self
            .tenant
            .select::<products::Entity>()
            .order_by_asc(products::Column::Name)
            .all(conn)
            .await?;

        let sale_totals: Vec<Decimal> = self
            .tenant
            .select::<sales::Entity>()
            .select_only()
            .column(sales::Column::Total)
            .into_tuple()
            .all(conn)
            .await?;
        let purchase_totals: Vec<Decimal> = self
            .tenant
            .select::<purchases::Entity>()
            .select_only()
            .column(purchases::Column::Total)
            .into_tuple()
            .all(conn)
            .await?;

        let stats = DashboardStats {
            total_products: u64::try_from(all_products.len()).unwrap_or(u64::MAX),
            total_sales_value: AnalyticsService::total(sale_totals),
            total_purchases_value: AnalyticsService::total(purchase_totals),
        };

        let limit = usize::try_from(WARNING_LIMIT).unwrap_or(usize::MAX);
        let mut low_stock: Vec<products::Model> = all_products
            .iter()
            .filter(|p| AnalyticsService::is_low_stock(p.quantity, p.min_limit))
            .cloned()
            .collect();
        low_stock.sort_by_key(|p| p.quantity);
        low_stock.truncate(limit);

        let mut expiring: Vec<products::Model> = all_products
            .into_iter()
            .filter(|p| {
                p.expiry_date
                    .is_some_and(|expiry| AnalyticsService::is_expiring(expiry, today))
            })
            .collect();
        expiring.sort_by_key(|p| p.expiry_date);
        expiring.truncate(limit);

        let recent_sales = self
            .tenant
            .select::<sales::Entity>()
            .order_by_desc(sales::Column::Date)
            .order_by_desc(sales::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(conn)
            .await?;
        let recent_purchases = self
            .tenant
            .select::<purchases::Entity>()
            .order_by_desc(purchases::Column::Date)
            .order_by_desc(purchases::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(conn)
            .await?;

        Ok(Dashboard {
            stats,
            low_stock,
            expiring,
            recent_sales: sale_views(&self.tenant, recent_sales).await?,
            recent_purchases: purchase_views(&self.tenant, recent_purchases).await?,
        })
    }

    /// Builds the monthly series and rankings as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn analysis(&self, today: NaiveDate) -> Result<AnalysisReport, RepoError> {
        let conn = self.tenant.conn();
        let window_start = AnalyticsService::series_start(today)
            .first_day()
            .unwrap_or(today);

        let sales_in_window: Vec<(NaiveDate, Decimal)> = self
            .tenant
            .select::<sales::Entity>()
            .select_only()
            .column(sales::Column::Date)
            .column(sales::Column::Total)
            .filter(sales::Column::Date.gte(window_start))
            .into_tuple()
            .all(conn)
            .await?;
        let purchases_in_window: Vec<(NaiveDate, Decimal)> = self
            .tenant
            .select::<purchases::Entity>()
            .select_only()
            .column(purchases::Column::Date)
            .column(purchases::Column::Total)
            .filter(purchases::Column::Date.gte(window_start))
            .into_tuple()
            .all(conn)
            .await?;
        let monthly_stats =
            AnalyticsService::monthly_series(today, &sales_in_window, &purchases_in_window);

        let revenue: Vec<(Uuid, Decimal)> = self
            .tenant
            .select::<sales::Entity>()
            .select_only()
            .column(sales::Column::ProductId)
            .column(sales::Column::Total)
            .order_by_asc(sales::Column::Date)
            .into_tuple()
            .all(conn)
            .await?;
        let received: Vec<(Uuid, i32)> = self
            .tenant
            .select::<purchases::Entity>()
            .select_only()
            .column(purchases::Column::ProductId)
            .column(purchases::Column::Quantity)
            .order_by_asc(purchases::Column::Date)
            .into_tuple()
            .all(conn)
            .await?;
        let treatment_names: Vec<String> = self
            .tenant
            .select::<treatments::Entity>()
            .select_only()
            .column(treatments::Column::TreatmentName)
            .order_by_asc(treatments::Column::Date)
            .into_tuple()
            .all(conn)
            .await?;

        let names = names_of(
            conn,
            self.tenant.select::<products::Entity>(),
            revenue
                .iter()
                .map(|(id, _)| *id)
                .chain(received.iter().map(|(id, _)| *id)),
        )
        .await?;

        let top_products =
            AnalyticsService::top_named(AnalyticsService::rank(revenue), |id| names.get(id).cloned());
        let top_purchased_products = AnalyticsService::top_named(
            AnalyticsService::rank(
                received
                    .into_iter()
                    .map(|(id, quantity)| (id, Decimal::from(quantity))),
            ),
            |id| names.get(id).cloned(),
        );

        Ok(AnalysisReport {
            monthly_stats,
            top_products,
            top_purchased_products,
            top_treatments: AnalyticsService::top_treatments(treatment_names),
        })
    }
}
