//! Sale repository. A sale debits stock and charges a customer.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::ledger::{
    Charge, CustomerCharge, EntityKind, LedgerError, LineAmounts, StockMovement,
};

use super::customer::resolve_customer;
use super::party::{name_or_deleted, names_of};
use crate::entities::{customers, products, sales};
use crate::error::RepoError;
use crate::postings::{apply_stock, charge_customer, reverse_stock, uncharge_customer};
use crate::tenant::{TenantDb, TenantTxn};

/// Input for creating or replacing a sale.
#[derive(Debug, Clone)]
pub struct SaleInput {
    /// Product sold.
    pub product_id: Uuid,
    /// Buyer. On create, `None` books against the walk-in customer; on
    /// update it keeps the current customer.
    pub customer_id: Option<Uuid>,
    /// Units sold.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
    /// Amount paid at the counter.
    pub paid: Decimal,
    /// Sale date (today on create, unchanged on update).
    pub date: Option<NaiveDate>,
}

/// A sale with its product and customer names.
#[derive(Debug, Clone)]
pub struct SaleView {
    /// The sale record.
    pub sale: sales::Model,
    /// Product name, or `deleted`.
    pub product_name: String,
    /// Customer name, or `deleted`.
    pub customer_name: String,
}

/// Repository for sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    tenant: TenantDb,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self) -> Result<Vec<SaleView>, RepoError> {
        let rows = self
            .tenant
            .select::<sales::Entity>()
            .order_by_desc(sales::Column::Date)
            .order_by_desc(sales::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;
        self.views(rows).await
    }

    /// Fetches one sale.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the sale is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<SaleView, RepoError> {
        let sale = self
            .tenant
            .find::<sales::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Sale))?;
        let mut views = self.views(vec![sale]).await?;
        views.pop().ok_or_else(|| LedgerError::NotFound(EntityKind::Sale).into())
    }

    /// Records a sale.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad amounts, `NotFound` for an unknown
    /// product or customer and `InsufficientStock` when the product does not
    /// have enough units.
    pub async fn create(&self, input: SaleInput) -> Result<SaleView, RepoError> {
        let amounts = LineAmounts::compute(input.quantity, input.price, input.paid)?;

        let sale = self
            .tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { create_in(txn, input, amounts).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            sale_id = %sale.id,
            product_id = %sale.product_id,
            quantity = sale.quantity,
            "Sale recorded"
        );
        self.get(sale.id).await
    }

    /// Replaces a sale, reversing its old stock and balance effects and
    /// applying the new ones in the same transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], plus `NotFound` for an unknown sale. On
    /// error nothing changes.
    pub async fn update(&self, id: Uuid, input: SaleInput) -> Result<SaleView, RepoError> {
        let amounts = LineAmounts::compute(input.quantity, input.price, input.paid)?;

        self.tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { update_in(txn, id, input, amounts).await })
            })
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), sale_id = %id, "Sale updated");
        self.get(id).await
    }

    /// Deletes a sale and reverses its effects.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the sale is not in this clinic.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tenant
            .atomically(move |txn| Box::pin(async move { delete_in(txn, id).await }))
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), sale_id = %id, "Sale deleted");
        Ok(())
    }

    async fn views(&self, rows: Vec<sales::Model>) -> Result<Vec<SaleView>, RepoError> {
        sale_views(&self.tenant, rows).await
    }
}

/// Attaches product and customer names to sales.
pub(crate) async fn sale_views(
    tenant: &TenantDb,
    rows: Vec<sales::Model>,
) -> Result<Vec<SaleView>, RepoError> {
    let products = names_of(
        tenant.conn(),
        tenant.select::<products::Entity>(),
        rows.iter().map(|s| s.product_id),
    )
    .await?;
    let customers = names_of(
        tenant.conn(),
        tenant.select::<customers::Entity>(),
        rows.iter().map(|s| s.customer_id),
    )
    .await?;

    Ok(rows
        .into_iter()
        .map(|sale| SaleView {
            product_name: name_or_deleted(&products, sale.product_id),
            customer_name: name_or_deleted(&customers, sale.customer_id),
            sale,
        })
        .collect())
}

fn charge_of(sale: &sales::Model) -> Charge {
    Charge::new(sale.total, sale.paid)
}

async fn load(txn: &TenantTxn, id: Uuid) -> Result<sales::Model, RepoError> {
    Ok(txn
        .find::<sales::Entity>(id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Sale))?)
}

async fn create_in(
    txn: &TenantTxn,
    input: SaleInput,
    amounts: LineAmounts,
) -> Result<sales::Model, RepoError> {
    let customer_id = resolve_customer(txn, input.customer_id).await?;

    apply_stock(txn, input.product_id, StockMovement::Debit(input.quantity), None).await?;
    charge_customer(txn, customer_id, CustomerCharge::Sale, amounts.charge()).await?;

    let now = Utc::now();
    let sale = sales::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(txn.clinic_id().into_inner()),
        product_id: Set(input.product_id),
        customer_id: Set(customer_id),
        quantity: Set(input.quantity),
        price: Set(input.price),
        total: Set(amounts.total),
        paid: Set(amounts.paid),
        rest: Set(amounts.rest),
        date: Set(input.date.unwrap_or_else(|| now.date_naive())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn.conn())
    .await?;
    Ok(sale)
}

async fn update_in(
    txn: &TenantTxn,
    id: Uuid,
    input: SaleInput,
    amounts: LineAmounts,
) -> Result<(), RepoError> {
    let old = load(txn, id).await?;

    reverse_stock(txn, old.product_id, StockMovement::Debit(old.quantity)).await?;
    uncharge_customer(txn, old.customer_id, CustomerCharge::Sale, charge_of(&old)).await?;

    let customer_id = match input.customer_id {
        Some(customer_id) => resolve_customer(txn, Some(customer_id)).await?,
        None => old.customer_id,
    };
    apply_stock(txn, input.product_id, StockMovement::Debit(input.quantity), None).await?;
    charge_customer(txn, customer_id, CustomerCharge::Sale, amounts.charge()).await?;

    let date = input.date.unwrap_or(old.date);
    let mut active: sales::ActiveModel = old.into();
    active.product_id = Set(input.product_id);
    active.customer_id = Set(customer_id);
    active.quantity = Set(input.quantity);
    active.price = Set(input.price);
    active.total = Set(amounts.total);
    active.paid = Set(amounts.paid);
    active.rest = Set(amounts.rest);
    active.date = Set(date);
    active.updated_at = Set(Utc::now());
    active.update(txn.conn()).await?;
    Ok(())
}

async fn delete_in(txn: &TenantTxn, id: Uuid) -> Result<(), RepoError> {
    let old = load(txn, id).await?;

    reverse_stock(txn, old.product_id, StockMovement::Debit(old.quantity)).await?;
    uncharge_customer(txn, old.customer_id, CustomerCharge::Sale, charge_of(&old)).await?;

    txn.delete::<sales::Entity>(old.id).await?;
    Ok(())
}
