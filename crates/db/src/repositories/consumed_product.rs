//! Consumed product repository: stock used inside the clinic and never
//! billed.

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::ledger::{EntityKind, LedgerError, StockMovement, validate_quantity};

use super::party::{name_or_deleted, names_of, optional_text};
use crate::entities::{consumed_products, products};
use crate::error::RepoError;
use crate::postings::{apply_stock, reverse_stock};
use crate::tenant::{TenantDb, TenantTxn};

/// Input for creating or replacing a consumed product record.
#[derive(Debug, Clone)]
pub struct ConsumedProductInput {
    /// Product used.
    pub product_id: Uuid,
    /// Units used.
    pub quantity: i32,
    /// What the units were used for.
    pub notes: Option<String>,
    /// Date of use (today on create, unchanged on update).
    pub date: Option<NaiveDate>,
}

/// A consumed product record with its product name.
#[derive(Debug, Clone)]
pub struct ConsumedProductView {
    /// The consumed product record.
    pub consumed: consumed_products::Model,
    /// Product name, or `deleted`.
    pub product_name: String,
}

/// Repository for consumed product records.
#[derive(Debug, Clone)]
pub struct ConsumedProductRepository {
    tenant: TenantDb,
}

impl ConsumedProductRepository {
    /// Creates a new consumed product repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists records, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self) -> Result<Vec<ConsumedProductView>, RepoError> {
        let rows = self
            .tenant
            .select::<consumed_products::Entity>()
            .order_by_desc(consumed_products::Column::Date)
            .order_by_desc(consumed_products::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;
        self.views(rows).await
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<ConsumedProductView, RepoError> {
        let consumed = self
            .tenant
            .find::<consumed_products::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::ConsumedProduct))?;
        let mut views = self.views(vec![consumed]).await?;
        views
            .pop()
            .ok_or_else(|| LedgerError::NotFound(EntityKind::ConsumedProduct).into())
    }

    /// Records internal use of a product.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive quantity, `NotFound` for an
    /// unknown product and `InsufficientStock` when not enough units are on
    /// hand.
    pub async fn create(
        &self,
        input: ConsumedProductInput,
    ) -> Result<ConsumedProductView, RepoError> {
        validate_quantity(input.quantity)?;

        let consumed = self
            .tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { create_in(txn, input).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            consumed_product_id = %consumed.id,
            product_id = %consumed.product_id,
            quantity = consumed.quantity,
            "Product consumption recorded"
        );
        self.get(consumed.id).await
    }

    /// Replaces a record, moving its stock debit in the same transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], plus `NotFound` for an unknown record.
    pub async fn update(
        &self,
        id: Uuid,
        input: ConsumedProductInput,
    ) -> Result<ConsumedProductView, RepoError> {
        validate_quantity(input.quantity)?;

        self.tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { update_in(txn, id, input).await })
            })
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), consumed_product_id = %id, "Product consumption updated");
        self.get(id).await
    }

    /// Deletes a record and returns its units to stock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record is not in this clinic.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tenant
            .atomically(move |txn| Box::pin(async move { delete_in(txn, id).await }))
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), consumed_product_id = %id, "Product consumption deleted");
        Ok(())
    }

    async fn views(
        &self,
        rows: Vec<consumed_products::Model>,
    ) -> Result<Vec<ConsumedProductView>, RepoError> {
        let products = names_of(
            self.tenant.conn(),
            self.tenant.select::<products::Entity>(),
            rows.iter().map(|c| c.product_id),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|consumed| ConsumedProductView {
                product_name: name_or_deleted(&products, consumed.product_id),
                consumed,
            })
            .collect())
    }
}

async fn load(txn: &TenantTxn, id: Uuid) -> Result<consumed_products::Model, RepoError> {
    Ok(txn
        .find::<consumed_products::Entity>(id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::ConsumedProduct))?)
}

async fn create_in(
    txn: &TenantTxn,
    input: ConsumedProductInput,
) -> Result<consumed_products::Model, RepoError> {
    apply_stock(txn, input.product_id, StockMovement::Debit(input.quantity), None).await?;

    let now = Utc::now();
    let consumed = consumed_products::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(txn.clinic_id().into_inner()),
        product_id: Set(input.product_id),
        quantity: Set(input.quantity),
        notes: Set(optional_text(input.notes)),
        date: Set(input.date.unwrap_or_else(|| now.date_naive())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn.conn())
    .await?;
    Ok(consumed)
}

async fn update_in(
    txn: &TenantTxn,
    id: Uuid,
    input: ConsumedProductInput,
) -> Result<(), RepoError> {
    let old = load(txn, id).await?;

    reverse_stock(txn, old.product_id, StockMovement::Debit(old.quantity)).await?;
    apply_stock(txn, input.product_id, StockMovement::Debit(input.quantity), None).await?;

    let date = input.date.unwrap_or(old.date);
    let mut active: consumed_products::ActiveModel = old.into();
    active.product_id = Set(input.product_id);
    active.quantity = Set(input.quantity);
    active.notes = Set(optional_text(input.notes));
    active.date = Set(date);
    active.updated_at = Set(Utc::now());
    active.update(txn.conn()).await?;
    Ok(())
}

async fn delete_in(txn: &TenantTxn, id: Uuid) -> Result<(), RepoError> {
    let old = load(txn, id).await?;
    reverse_stock(txn, old.product_id, StockMovement::Debit(old.quantity)).await?;
    txn.delete::<consumed_products::Entity>(old.id).await?;
    Ok(())
}
