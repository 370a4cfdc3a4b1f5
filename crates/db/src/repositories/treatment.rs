//! Treatment repository. Treatments charge a customer's `total_treatments`
//! and never touch stock.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::ledger::{
    Charge, CustomerCharge, EntityKind, LedgerError, LineAmounts, require_text,
};

use super::customer::resolve_customer;
use super::party::{name_or_deleted, names_of};
use crate::entities::{customers, treatments};
use crate::error::RepoError;
use crate::postings::{charge_customer, uncharge_customer};
use crate::tenant::{TenantDb, TenantTxn};

/// Input for creating or replacing a treatment.
#[derive(Debug, Clone)]
pub struct TreatmentInput {
    /// Treated customer. On create, `None` books against the walk-in
    /// customer; on update it keeps the current customer.
    pub customer_id: Option<Uuid>,
    /// What was done (or the animal treated).
    pub treatment_name: String,
    /// Number of sessions or units.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
    /// Amount paid up front.
    pub paid: Decimal,
    /// Treatment date (today on create, unchanged on update).
    pub date: Option<NaiveDate>,
}

/// A treatment with its customer name.
#[derive(Debug, Clone)]
pub struct TreatmentView {
    /// The treatment record.
    pub treatment: treatments::Model,
    /// Customer name, or `deleted`.
    pub customer_name: String,
}

/// Repository for treatments.
#[derive(Debug, Clone)]
pub struct TreatmentRepository {
    tenant: TenantDb,
}

impl TreatmentRepository {
    /// Creates a new treatment repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists treatments, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self) -> Result<Vec<TreatmentView>, RepoError> {
        let rows = self
            .tenant
            .select::<treatments::Entity>()
            .order_by_desc(treatments::Column::Date)
            .order_by_desc(treatments::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;
        self.views(rows).await
    }

    /// Fetches one treatment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the treatment is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<TreatmentView, RepoError> {
        let treatment = self
            .tenant
            .find::<treatments::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Treatment))?;
        let mut views = self.views(vec![treatment]).await?;
        views
            .pop()
            .ok_or_else(|| LedgerError::NotFound(EntityKind::Treatment).into())
    }

    /// Records a treatment.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank name or bad amounts and `NotFound`
    /// for an unknown customer.
    pub async fn create(&self, input: TreatmentInput) -> Result<TreatmentView, RepoError> {
        let input = validated(input)?;
        let amounts = LineAmounts::compute(input.quantity, input.price, input.paid)?;

        let treatment = self
            .tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { create_in(txn, input, amounts).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            treatment_id = %treatment.id,
            customer_id = %treatment.customer_id,
            "Treatment recorded"
        );
        self.get(treatment.id).await
    }

    /// Replaces a treatment, moving its charge in the same transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], plus `NotFound` for an unknown treatment.
    pub async fn update(
        &self,
        id: Uuid,
        input: TreatmentInput,
    ) -> Result<TreatmentView, RepoError> {
        let input = validated(input)?;
        let amounts = LineAmounts::compute(input.quantity, input.price, input.paid)?;

        self.tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { update_in(txn, id, input, amounts).await })
            })
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), treatment_id = %id, "Treatment updated");
        self.get(id).await
    }

    /// Deletes a treatment and removes its charge.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the treatment is not in this clinic.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tenant
            .atomically(move |txn| Box::pin(async move { delete_in(txn, id).await }))
            .await?;

        info!(clinic_id = %self.tenant.clinic_id(), treatment_id = %id, "Treatment deleted");
        Ok(())
    }

    async fn views(&self, rows: Vec<treatments::Model>) -> Result<Vec<TreatmentView>, RepoError> {
        let customers = names_of(
            self.tenant.conn(),
            self.tenant.select::<customers::Entity>(),
            rows.iter().map(|t| t.customer_id),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|treatment| TreatmentView {
                customer_name: name_or_deleted(&customers, treatment.customer_id),
                treatment,
            })
            .collect())
    }
}

fn validated(mut input: TreatmentInput) -> Result<TreatmentInput, LedgerError> {
    input.treatment_name = require_text("Treatment name", &input.treatment_name)?;
    Ok(input)
}

fn charge_of(treatment: &treatments::Model) -> Charge {
    Charge::new(treatment.total, treatment.paid)
}

async fn load(txn: &TenantTxn, id: Uuid) -> Result<treatments::Model, RepoError> {
    Ok(txn
        .find::<treatments::Entity>(id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Treatment))?)
}

async fn create_in(
    txn: &TenantTxn,
    input: TreatmentInput,
    amounts: LineAmounts,
) -> Result<treatments::Model, RepoError> {
    let customer_id = resolve_customer(txn, input.customer_id).await?;
    charge_customer(txn, customer_id, CustomerCharge::Treatment, amounts.charge()).await?;

    let now = Utc::now();
    let treatment = treatments::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(txn.clinic_id().into_inner()),
        customer_id: Set(customer_id),
        treatment_name: Set(input.treatment_name),
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
    Ok(treatment)
}

async fn update_in(
    txn: &TenantTxn,
    id: Uuid,
    input: TreatmentInput,
    amounts: LineAmounts,
) -> Result<(), RepoError> {
    let old = load(txn, id).await?;
    uncharge_customer(txn, old.customer_id, CustomerCharge::Treatment, charge_of(&old)).await?;

    let customer_id = match input.customer_id {
        Some(customer_id) => resolve_customer(txn, Some(customer_id)).await?,
        None => old.customer_id,
    };
    charge_customer(txn, customer_id, CustomerCharge::Treatment, amounts.charge()).await?;

    let date = input.date.unwrap_or(old.date);
    let mut active: treatments::ActiveModel = old.into();
    active.customer_id = Set(customer_id);
    active.treatment_name = Set(input.treatment_name);
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
    uncharge_customer(txn, old.customer_id, CustomerCharge::Treatment, charge_of(&old)).await?;
    txn.delete::<treatments::Entity>(old.id).await?;
    Ok(())
}
