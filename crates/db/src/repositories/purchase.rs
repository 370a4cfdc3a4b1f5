//! Purchase repository. A purchase credits stock and books the full amount
//! as debt on the supplier.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::ledger::{Charge, EntityKind, LedgerError, LineAmounts, StockMovement};

use super::party::{name_or_deleted, names_of};
use crate::entities::{products, purchases, suppliers};
use crate::error::RepoError;
use crate::postings::{apply_stock, charge_supplier, reverse_stock, uncharge_supplier};
use crate::tenant::{TenantDb, TenantTxn};

/// Input for creating or replacing a purchase.
#[derive(Debug, Clone)]
pub struct PurchaseInput {
    /// Product bought.
    pub product_id: Uuid,
    /// Supplier the debt is owed to.
    pub supplier_id: Uuid,
    /// Units received.
    pub quantity: i32,
    /// Unit cost.
    pub price: Decimal,
    /// Expiry of the received batch; overwrites the product's expiry.
    pub expiry_date: Option<NaiveDate>,
    /// Purchase date (today on create, unchanged on update).
    pub date: Option<NaiveDate>,
}

/// A purchase with its product and supplier names.
#[derive(Debug, Clone)]
pub struct PurchaseView {
    /// The purchase record.
    pub purchase: purchases::Model,
    /// Product name, or `deleted`.
    pub product_name: String,
    /// Supplier name, or `deleted`.
    pub supplier_name: String,
}

/// Repository for purchases.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    tenant: TenantDb,
}

impl PurchaseRepository {
    /// Creates a new purchase repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self) -> Result<Vec<PurchaseView>, RepoError> {
        let rows = self
            .tenant
            .select::<purchases::Entity>()
            .order_by_desc(purchases::Column::Date)
            .order_by_desc(purchases::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;
        purchase_views(&self.tenant, rows).await
    }

    /// Fetches one purchase.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the purchase is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<PurchaseView, RepoError> {
        let purchase = self
            .tenant
            .find::<purchases::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Purchase))?;
        let mut views = purchase_views(&self.tenant, vec![purchase]).await?;
        views
            .pop()
            .ok_or_else(|| LedgerError::NotFound(EntityKind::Purchase).into())
    }

    /// Records a purchase.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad amounts and `NotFound` for an unknown
    /// product or supplier.
    pub async fn create(&self, input: PurchaseInput) -> Result<PurchaseView, RepoError> {
        let amounts = LineAmounts::compute(input.quantity, input.price, Decimal::ZERO)?;

        let purchase = self
            .tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { create_in(txn, input, amounts).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            purchase_id = %purchase.id,
            product_id = %purchase.product_id,
            quantity = purchase.quantity,
            "Purchase recorded"
        );
        self.get(purchase.id).await
    }

    /// Replaces a purchase, reversing its old effects and applying the new
    /// ones in the same transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], plus `NotFound` for an unknown purchase and
    /// `InsufficientStock` when the received units have already left stock.
    pub async fn update(&self, id: Uuid, input: PurchaseInput) -> Result<PurchaseView, RepoError> {
        let amounts = LineAmounts::compute(input.quantity, input.price, Decimal::ZERO)?;

        self.tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { update_in(txn, id, input, amounts).await })
            })
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), purchase_id = %id, "Purchase updated");
        self.get(id).await
    }

    /// Deletes a purchase and reverses its effects.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the purchase is not in this clinic and
    /// `InsufficientStock` when the received units have already left stock.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tenant
            .atomically(move |txn| Box::pin(async move { delete_in(txn, id).await }))
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), purchase_id = %id, "Purchase deleted");
        Ok(())
    }
}

/// Attaches product and supplier names to purchases.
pub(crate) async fn purchase_views(
    tenant: &TenantDb,
    rows: Vec<purchases::Model>,
) -> Result<Vec<PurchaseView>, RepoError> {
    let products = names_of(
        tenant.conn(),
        tenant.select::<products::Entity>(),
        rows.iter().map(|p| p.product_id),
    )
    .await?;
    let suppliers = names_of(
        tenant.conn(),
        tenant.select::<suppliers::Entity>(),
        rows.iter().map(|p| p.supplier_id),
    )
    .await?;

    Ok(rows
        .into_iter()
        .map(|purchase| PurchaseView {
            product_name: name_or_deleted(&products, purchase.product_id),
            supplier_name: name_or_deleted(&suppliers, purchase.supplier_id),
            purchase,
        })
        .collect())
}

fn charge_of(purchase: &purchases::Model) -> Charge {
    Charge::new(purchase.total, Decimal::ZERO)
}

async fn load(txn: &TenantTxn, id: Uuid) -> Result<purchases::Model, RepoError> {
    Ok(txn
        .find::<purchases::Entity>(id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Purchase))?)
}

async fn create_in(
    txn: &TenantTxn,
    input: PurchaseInput,
    amounts: LineAmounts,
) -> Result<purchases::Model, RepoError> {
    apply_stock(
        txn,
        input.product_id,
        StockMovement::Credit(input.quantity),
        input.expiry_date,
    )
    .await?;
    charge_supplier(txn, input.supplier_id, amounts.charge()).await?;

    let now = Utc::now();
    let purchase = purchases::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(txn.clinic_id().into_inner()),
        product_id: Set(input.product_id),
        supplier_id: Set(input.supplier_id),
        quantity: Set(input.quantity),
        price: Set(input.price),
        total: Set(amounts.total),
        expiry_date: Set(input.expiry_date),
        date: Set(input.date.unwrap_or_else(|| now.date_naive())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn.conn())
    .await?;
    Ok(purchase)
}

async fn update_in(
    txn: &TenantTxn,
    id: Uuid,
    input: PurchaseInput,
    amounts: LineAmounts,
) -> Result<(), RepoError> {
    let old = load(txn, id).await?;

    reverse_stock(txn, old.product_id, StockMovement::Credit(old.quantity)).await?;
    uncharge_supplier(txn, old.supplier_id, charge_of(&old)).await?;

    apply_stock(
        txn,
        input.product_id,
        StockMovement::Credit(input.quantity),
        input.expiry_date,
    )
    .await?;
    charge_supplier(txn, input.supplier_id, amounts.charge()).await?;

    let date = input.date.unwrap_or(old.date);
    let mut active: purchases::ActiveModel = old.into();
    active.product_id = Set(input.product_id);
    active.supplier_id = Set(input.supplier_id);
    active.quantity = Set(input.quantity);
    active.price = Set(input.price);
    active.total = Set(amounts.total);
    active.expiry_date = Set(input.expiry_date);
    active.date = Set(date);
    active.updated_at = Set(Utc::now());
    active.update(txn.conn()).await?;
    Ok(())
}

async fn delete_in(txn: &TenantTxn, id: Uuid) -> Result<(), RepoError> {
    let old = load(txn, id).await?;

    reverse_stock(txn, old.product_id, StockMovement::Credit(old.quantity)).await?;
    uncharge_supplier(txn, old.supplier_id, charge_of(&old)).await?;

    txn.delete::<purchases::Entity>(old.id).await?;
    Ok(())
}
