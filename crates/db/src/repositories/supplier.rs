//! Supplier repository.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::ledger::{EntityKind, LedgerError, require_text, validate_payment_amount};

use super::party::{CreatePartyInput, PaymentInput, UpdatePartyInput, optional_text};
use crate::entities::{supplier_payments, suppliers};
use crate::error::{RepoError, conflict_on_duplicate};
use crate::postings::{supplier_balance, write_supplier_balance};
use crate::tenant::{TenantDb, TenantTxn};

const DUPLICATE_NAME: &str = "A supplier with this name already exists";

/// Supplier with its payments, oldest first.
#[derive(Debug, Clone)]
pub struct SupplierWithPayments {
    /// The supplier record.
    pub supplier: suppliers::Model,
    /// Payments ordered by date, then creation.
    pub payments: Vec<supplier_payments::Model>,
}

/// Repository for clinic suppliers.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    tenant: TenantDb,
}

impl SupplierRepository {
    /// Creates a new supplier repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists suppliers with their payments.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self) -> Result<Vec<SupplierWithPayments>, RepoError> {
        let suppliers = self
            .tenant
            .select::<suppliers::Entity>()
            .order_by_asc(suppliers::Column::Name)
            .all(self.tenant.conn())
            .await?;

        let payments = self
            .tenant
            .select::<supplier_payments::Entity>()
            .order_by_asc(supplier_payments::Column::Date)
            .order_by_asc(supplier_payments::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;

        let mut by_supplier: HashMap<Uuid, Vec<supplier_payments::Model>> = HashMap::new();
        for payment in payments {
            by_supplier.entry(payment.supplier_id).or_default().push(payment);
        }

        Ok(suppliers
            .into_iter()
            .map(|supplier| {
                let payments = by_supplier.remove(&supplier.id).unwrap_or_default();
                SupplierWithPayments { supplier, payments }
            })
            .collect())
    }

    /// Fetches one supplier with payments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the supplier is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<SupplierWithPayments, RepoError> {
        let supplier = self
            .tenant
            .find::<suppliers::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Supplier))?;

        let payments = self
            .tenant
            .select::<supplier_payments::Entity>()
            .filter(supplier_payments::Column::SupplierId.eq(id))
            .order_by_asc(supplier_payments::Column::Date)
            .order_by_asc(supplier_payments::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;

        Ok(SupplierWithPayments { supplier, payments })
    }

    /// Creates a supplier with zero balances.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty name and `ConflictingState` for a
    /// duplicate name.
    pub async fn create(&self, input: CreatePartyInput) -> Result<suppliers::Model, RepoError> {
        let name = require_text("Name", &input.name)?;

        let now = Utc::now();
        let supplier = suppliers::ActiveModel {
            id: Set(Uuid::now_v7()),
            clinic_id: Set(self.tenant.clinic_id().into_inner()),
            name: Set(name),
            address: Set(optional_text(input.address)),
            phone: Set(optional_text(input.phone)),
            total_purchases: Set(Decimal::ZERO),
            total_paid: Set(Decimal::ZERO),
            total_rest: Set(Decimal::ZERO),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.tenant.conn())
        .await
        .map_err(|e| conflict_on_duplicate(e, DUPLICATE_NAME))?;

        info!(clinic_id = %self.tenant.clinic_id(), supplier_id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    /// Updates a supplier's name, address or phone.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the supplier is not in this clinic and
    /// `ConflictingState` when taking an existing name.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePartyInput,
    ) -> Result<suppliers::Model, RepoError> {
        let supplier = self
            .tenant
            .find::<suppliers::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Supplier))?;
        let version = supplier.version;

        let mut active: suppliers::ActiveModel = supplier.into();
        if let Some(name) = &input.name {
            active.name = Set(require_text("Name", name)?);
        }
        if let Some(address) = input.address {
            active.address = Set(optional_text(address));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(optional_text(phone));
        }
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now());

        let result = suppliers::Entity::update_many()
            .set(active)
            .filter(suppliers::Column::Id.eq(id))
            .filter(suppliers::Column::ClinicId.eq(self.tenant.clinic_id().into_inner()))
            .filter(suppliers::Column::Version.eq(version))
            .exec(self.tenant.conn())
            .await
            .map_err(|e| conflict_on_duplicate(e, DUPLICATE_NAME))?;
        if result.rows_affected == 0 {
            return Err(LedgerError::ConcurrentModification(id).into());
        }

        info!(clinic_id = %self.tenant.clinic_id(), supplier_id = %id, "Supplier updated");
        Ok(self.get(id).await?.supplier)
    }

    /// Deletes a supplier and its payments. Purchases keep their history and
    /// render the supplier as deleted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the supplier is not in this clinic.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if !self.tenant.delete::<suppliers::Entity>(id).await? {
            return Err(LedgerError::NotFound(EntityKind::Supplier).into());
        }
        info!(clinic_id = %self.tenant.clinic_id(), supplier_id = %id, "Supplier deleted");
        Ok(())
    }

    /// Records a payment to a supplier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown supplier and `Validation` for a
    /// non-positive amount.
    pub async fn add_payment(
        &self,
        supplier_id: Uuid,
        input: PaymentInput,
    ) -> Result<SupplierWithPayments, RepoError> {
        validate_payment_amount(input.amount)?;

        let payment_id = self
            .tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { add_payment_in(txn, supplier_id, input).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            %supplier_id,
            %payment_id,
            "Supplier payment recorded"
        );
        self.get(supplier_id).await
    }

    /// Edits a payment, moving `total_paid` by the difference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown supplier or payment and
    /// `Validation` for a non-positive amount.
    pub async fn update_payment(
        &self,
        supplier_id: Uuid,
        payment_id: Uuid,
        input: PaymentInput,
    ) -> Result<SupplierWithPayments, RepoError> {
        validate_payment_amount(input.amount)?;

        self.tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { update_payment_in(txn, supplier_id, payment_id, input).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            %supplier_id,
            %payment_id,
            "Supplier payment updated"
        );
        self.get(supplier_id).await
    }

    /// Deletes a payment, flooring `total_paid` at zero.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown supplier or payment.
    pub async fn delete_payment(
        &self,
        supplier_id: Uuid,
        payment_id: Uuid,
    ) -> Result<SupplierWithPayments, RepoError> {
        self.tenant
            .atomically(move |txn| {
                Box::pin(async move { delete_payment_in(txn, supplier_id, payment_id).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            %supplier_id,
            %payment_id,
            "Supplier payment deleted"
        );
        self.get(supplier_id).await
    }
}

async fn load_supplier(txn: &TenantTxn, id: Uuid) -> Result<suppliers::Model, RepoError> {
    Ok(txn
        .find::<suppliers::Entity>(id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Supplier))?)
}

async fn load_payment(
    txn: &TenantTxn,
    supplier_id: Uuid,
    payment_id: Uuid,
) -> Result<supplier_payments::Model, RepoError> {
    txn.find::<supplier_payments::Entity>(payment_id)
        .await?
        .filter(|p| p.supplier_id == supplier_id)
        .ok_or_else(|| LedgerError::NotFound(EntityKind::Payment).into())
}

async fn add_payment_in(
    txn: &TenantTxn,
    supplier_id: Uuid,
    input: PaymentInput,
) -> Result<Uuid, RepoError> {
    let supplier = load_supplier(txn, supplier_id).await?;

    let payment = supplier_payments::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(txn.clinic_id().into_inner()),
        supplier_id: Set(supplier_id),
        date: Set(input.date.unwrap_or_else(|| Utc::now().date_naive())),
        amount: Set(input.amount),
        notes: Set(optional_text(input.notes)),
        created_at: Set(Utc::now()),
    }
    .insert(txn.conn())
    .await?;

    let mut balance = supplier_balance(&supplier)?;
    balance.add_payment(input.amount)?;
    write_supplier_balance(txn, &supplier, balance).await?;
    Ok(payment.id)
}

async fn update_payment_in(
    txn: &TenantTxn,
    supplier_id: Uuid,
    payment_id: Uuid,
    input: PaymentInput,
) -> Result<(), RepoError> {
    let supplier = load_supplier(txn, supplier_id).await?;
    let payment = load_payment(txn, supplier_id, payment_id).await?;
    let old_amount = payment.amount;

    let mut active: supplier_payments::ActiveModel = payment.into();
    if let Some(date) = input.date {
        active.date = Set(date);
    }
    active.amount = Set(input.amount);
    if let Some(notes) = input.notes {
        active.notes = Set(optional_text(Some(notes)));
    }
    active.update(txn.conn()).await?;

    let mut balance = supplier_balance(&supplier)?;
    balance.change_payment(old_amount, input.amount)?;
    write_supplier_balance(txn, &supplier, balance).await
}

async fn delete_payment_in(
    txn: &TenantTxn,
    supplier_id: Uuid,
    payment_id: Uuid,
) -> Result<(), RepoError> {
    let supplier = load_supplier(txn, supplier_id).await?;
    let payment = load_payment(txn, supplier_id, payment_id).await?;

    txn.delete::<supplier_payments::Entity>(payment.id).await?;

    let mut balance = supplier_balance(&supplier)?;
    balance.remove_payment(payment.amount)?;
    write_supplier_balance(txn, &supplier, balance).await
}
