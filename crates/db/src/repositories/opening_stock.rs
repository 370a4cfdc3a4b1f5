//! Opening stock repository. An opening stock entry credits a product with
//! inventory that predates the ledger; it has no supplier.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::ledger::{
    EntityKind, LedgerError, StockMovement, require_text, validate_price, validate_quantity,
};

use super::party::{name_or_deleted, names_of};
use crate::entities::{opening_stocks, products};
use crate::error::RepoError;
use crate::postings::{apply_stock, reverse_stock};
use crate::tenant::{TenantDb, TenantTxn};

/// Input for creating or replacing an opening stock entry.
#[derive(Debug, Clone)]
pub struct OpeningStockInput {
    /// Product credited.
    pub product_id: Uuid,
    /// Units declared.
    pub quantity: i32,
    /// Expiry of the declared units; overwrites the product's expiry.
    pub expiry_date: Option<NaiveDate>,
    /// Where the stock came from.
    pub source: String,
    /// Unit cost, if known.
    pub price: Option<Decimal>,
    /// Date the stock was declared (today on create, unchanged on update).
    pub opening_date: Option<NaiveDate>,
}

/// An opening stock entry with its product name.
#[derive(Debug, Clone)]
pub struct OpeningStockView {
    /// The opening stock record.
    pub opening_stock: opening_stocks::Model,
    /// Product name, or `deleted`.
    pub product_name: String,
}

/// Repository for opening stock entries.
#[derive(Debug, Clone)]
pub struct OpeningStockRepository {
    tenant: TenantDb,
}

impl OpeningStockRepository {
    /// Creates a new opening stock repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self) -> Result<Vec<OpeningStockView>, RepoError> {
        let rows = self
            .tenant
            .select::<opening_stocks::Entity>()
            .order_by_desc(opening_stocks::Column::OpeningDate)
            .order_by_desc(opening_stocks::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;
        self.views(rows).await
    }

    /// Fetches one entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<OpeningStockView, RepoError> {
        let entry = self
            .tenant
            .find::<opening_stocks::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::OpeningStock))?;
        let mut views = self.views(vec![entry]).await?;
        views
            .pop()
            .ok_or_else(|| LedgerError::NotFound(EntityKind::OpeningStock).into())
    }

    /// Records opening stock.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad fields and `NotFound` for an unknown
    /// product.
    pub async fn create(&self, input: OpeningStockInput) -> Result<OpeningStockView, RepoError> {
        let input = validated(input)?;

        let entry = self
            .tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { create_in(txn, input).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            opening_stock_id = %entry.id,
            product_id = %entry.product_id,
            quantity = entry.quantity,
            "Opening stock recorded"
        );
        self.get(entry.id).await
    }

    /// Replaces an entry, moving its stock credit in the same transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], plus `NotFound` for an unknown entry and
    /// `InsufficientStock` when the declared units have already left stock.
    pub async fn update(
        &self,
        id: Uuid,
        input: OpeningStockInput,
    ) -> Result<OpeningStockView, RepoError> {
        let input = validated(input)?;

        self.tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { update_in(txn, id, input).await })
            })
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), opening_stock_id = %id, "Opening stock updated");
        self.get(id).await
    }

    /// Deletes an entry and takes its units back out of stock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry is not in this clinic and
    /// `InsufficientStock` when the declared units have already left stock.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tenant
            .atomically(move |txn| Box::pin(async move { delete_in(txn, id).await }))
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), opening_stock_id = %id, "Opening stock deleted");
        Ok(())
    }

    async fn views(
        &self,
        rows: Vec<opening_stocks::Model>,
    ) -> Result<Vec<OpeningStockView>, RepoError> {
        let products = names_of(
            self.tenant.conn(),
            self.tenant.select::<products::Entity>(),
            rows.iter().map(|o| o.product_id),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|opening_stock| OpeningStockView {
                product_name: name_or_deleted(&products, opening_stock.product_id),
                opening_stock,
            })
            .collect())
    }
}

fn validated(mut input: OpeningStockInput) -> Result<OpeningStockInput, LedgerError> {
    validate_quantity(input.quantity)?;
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    input.source = require_text("Source", &input.source)?;
    Ok(input)
}

async fn load(txn: &TenantTxn, id: Uuid) -> Result<opening_stocks::Model, RepoError> {
    Ok(txn
        .find::<opening_stocks::Entity>(id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::OpeningStock))?)
}

async fn create_in(
    txn: &TenantTxn,
    input: OpeningStockInput,
) -> Result<opening_stocks::Model, RepoError> {
    apply_stock(
        txn,
        input.product_id,
        StockMovement::Credit(input.quantity),
        input.expiry_date,
    )
    .await?;

    let now = Utc::now();
    let entry = opening_stocks::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(txn.clinic_id().into_inner()),
        product_id: Set(input.product_id),
        quantity: Set(input.quantity),
        expiry_date: Set(input.expiry_date),
        source: Set(input.source),
        price: Set(input.price),
        opening_date: Set(input.opening_date.unwrap_or_else(|| now.date_naive())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn.conn())
    .await?;
    Ok(entry)
}

async fn update_in(txn: &TenantTxn, id: Uuid, input: OpeningStockInput) -> Result<(), RepoError> {
    let old = load(txn, id).await?;

    reverse_stock(txn, old.product_id, StockMovement::Credit(old.quantity)).await?;
    apply_stock(
        txn,
        input.product_id,
        StockMovement::Credit(input.quantity),
        input.expiry_date,
    )
    .await?;

    let opening_date = input.opening_date.unwrap_or(old.opening_date);
    let mut active: opening_stocks::ActiveModel = old.into();
    active.product_id = Set(input.product_id);
    active.quantity = Set(input.quantity);
    active.expiry_date = Set(input.expiry_date);
    active.source = Set(input.source);
    active.price = Set(input.price);
    active.opening_date = Set(opening_date);
    active.updated_at = Set(Utc::now());
    active.update(txn.conn()).await?;
    Ok(())
}

async fn delete_in(txn: &TenantTxn, id: Uuid) -> Result<(), RepoError> {
    let old = load(txn, id).await?;
    reverse_stock(txn, old.product_id, StockMovement::Credit(old.quantity)).await?;
    txn.delete::<opening_stocks::Entity>(old.id).await?;
    Ok(())
}
