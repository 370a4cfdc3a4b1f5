//! Customer repository: master data, payments and the walk-in customer.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;
use vetledger_core::customer::{WALK_IN_CUSTOMER_NAME, guard_delete, guard_rename, is_walk_in};
use vetledger_core::ledger::{EntityKind, LedgerError, require_text, validate_payment_amount};

use super::party::{CreatePartyInput, PaymentInput, UpdatePartyInput, optional_text};
use crate::entities::{customer_payments, customers};
use crate::error::{RepoError, conflict_on_duplicate};
use crate::postings::{customer_balance, write_customer_balance};
use crate::tenant::{TenantDb, TenantTxn};

const DUPLICATE_NAME: &str = "A customer with this name already exists";

/// Customer with its payments, oldest first.
#[derive(Debug, Clone)]
pub struct CustomerWithPayments {
    /// The customer record.
    pub customer: customers::Model,
    /// Payments ordered by date, then creation.
    pub payments: Vec<customer_payments::Model>,
}

/// Repository for clinic customers.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    tenant: TenantDb,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists customers with their payments.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn list(&self) -> Result<Vec<CustomerWithPayments>, RepoError> {
        let customers = self
            .tenant
            .select::<customers::Entity>()
            .order_by_asc(customers::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;

        let payments = self
            .tenant
            .select::<customer_payments::Entity>()
            .order_by_asc(customer_payments::Column::Date)
            .order_by_asc(customer_payments::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;

        let mut by_customer: HashMap<Uuid, Vec<customer_payments::Model>> = HashMap::new();
        for payment in payments {
            by_customer.entry(payment.customer_id).or_default().push(payment);
        }

        Ok(customers
            .into_iter()
            .map(|customer| {
                let payments = by_customer.remove(&customer.id).unwrap_or_default();
                CustomerWithPayments { customer, payments }
            })
            .collect())
    }

    /// Fetches one customer with payments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the customer is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<CustomerWithPayments, RepoError> {
        let customer = self
            .tenant
            .find::<customers::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Customer))?;

        let payments = self
            .tenant
            .select::<customer_payments::Entity>()
            .filter(customer_payments::Column::CustomerId.eq(id))
            .order_by_asc(customer_payments::Column::Date)
            .order_by_asc(customer_payments::Column::CreatedAt)
            .all(self.tenant.conn())
            .await?;

        Ok(CustomerWithPayments { customer, payments })
    }

    /// Creates a customer with zero balances.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty name and `ConflictingState` for a
    /// duplicate or reserved name.
    pub async fn create(&self, input: CreatePartyInput) -> Result<customers::Model, RepoError> {
        let name = require_text("Name", &input.name)?;
        if is_walk_in(&name) {
            return Err(LedgerError::ConflictingState(format!(
                "The name \"{WALK_IN_CUSTOMER_NAME}\" is reserved"
            ))
            .into());
        }

        let customer = new_customer(
            self.tenant.clinic_id().into_inner(),
            name,
            optional_text(input.address),
            optional_text(input.phone),
        )
        .insert(self.tenant.conn())
        .await
        .map_err(|e| conflict_on_duplicate(e, DUPLICATE_NAME))?;

        info!(clinic_id = %self.tenant.clinic_id(), customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Updates a customer's name, address or phone.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the customer is not in this clinic and
    /// `ConflictingState` when renaming the walk-in customer or taking an
    /// existing name.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePartyInput,
    ) -> Result<customers::Model, RepoError> {
        let customer = self
            .tenant
            .find::<customers::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Customer))?;
        let version = customer.version;

        let name = match &input.name {
            Some(name) => Some(guard_rename(&customer.name, name)?),
            None => None,
        };

        let mut active: customers::ActiveModel = customer.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(address) = input.address {
            active.address = Set(optional_text(address));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(optional_text(phone));
        }
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now());

        let result = customers::Entity::update_many()
            .set(active)
            .filter(customers::Column::Id.eq(id))
            .filter(customers::Column::ClinicId.eq(self.tenant.clinic_id().into_inner()))
            .filter(customers::Column::Version.eq(version))
            .exec(self.tenant.conn())
            .await
            .map_err(|e| conflict_on_duplicate(e, DUPLICATE_NAME))?;
        if result.rows_affected == 0 {
            return Err(LedgerError::ConcurrentModification(id).into());
        }

        info!(clinic_id = %self.tenant.clinic_id(), customer_id = %id, "Customer updated");
        Ok(self.get(id).await?.customer)
    }

    /// Deletes a customer and its payments. Sales and treatments keep their
    /// history and render the customer as deleted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the customer is not in this clinic and
    /// `ConflictingState` for the walk-in customer.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let customer = self
            .tenant
            .find::<customers::Entity>(id)
            .await?
            .ok_or(LedgerError::NotFound(EntityKind::Customer))?;
        guard_delete(&customer.name)?;

        self.tenant.delete::<customers::Entity>(id).await?;
        info!(clinic_id = %self.tenant.clinic_id(), customer_id = %id, "Customer deleted");
        Ok(())
    }

    /// Records a payment from a customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown customer and `Validation` for a
    /// non-positive amount.
    pub async fn add_payment(
        &self,
        customer_id: Uuid,
        input: PaymentInput,
    ) -> Result<CustomerWithPayments, RepoError> {
        validate_payment_amount(input.amount)?;

        let payment_id = self
            .tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { add_payment_in(txn, customer_id, input).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            %customer_id,
            %payment_id,
            "Customer payment recorded"
        );
        self.get(customer_id).await
    }

    /// Edits a payment, moving `total_paid` by the difference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown customer or payment and
    /// `Validation` for a non-positive amount.
    pub async fn update_payment(
        &self,
        customer_id: Uuid,
        payment_id: Uuid,
        input: PaymentInput,
    ) -> Result<CustomerWithPayments, RepoError> {
        validate_payment_amount(input.amount)?;

        self.tenant
            .atomically(move |txn| {
                let input = input.clone();
                Box::pin(async move { update_payment_in(txn, customer_id, payment_id, input).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            %customer_id,
            %payment_id,
            "Customer payment updated"
        );
        self.get(customer_id).await
    }

    /// Deletes a payment, flooring `total_paid` at zero.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown customer or payment.
    pub async fn delete_payment(
        &self,
        customer_id: Uuid,
        payment_id: Uuid,
    ) -> Result<CustomerWithPayments, RepoError> {
        self.tenant
            .atomically(move |txn| {
                Box::pin(async move { delete_payment_in(txn, customer_id, payment_id).await })
            })
            .await?;

        info!(
            clinic_id = %self.tenant.clinic_id(),
            %customer_id,
            %payment_id,
            "Customer payment deleted"
        );
        self.get(customer_id).await
    }
}

fn new_customer(
    clinic_id: Uuid,
    name: String,
    address: Option<String>,
    phone: Option<String>,
) -> customers::ActiveModel {
    let now = Utc::now();
    customers::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(clinic_id),
        name: Set(name),
        address: Set(address),
        phone: Set(phone),
        total_sales: Set(Decimal::ZERO),
        total_treatments: Set(Decimal::ZERO),
        total_paid: Set(Decimal::ZERO),
        total_rest: Set(Decimal::ZERO),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

async fn load_customer(txn: &TenantTxn, id: Uuid) -> Result<customers::Model, RepoError> {
    Ok(txn
        .find::<customers::Entity>(id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Customer))?)
}

async fn load_payment(
    txn: &TenantTxn,
    customer_id: Uuid,
    payment_id: Uuid,
) -> Result<customer_payments::Model, RepoError> {
    txn.find::<customer_payments::Entity>(payment_id)
        .await?
        .filter(|p| p.customer_id == customer_id)
        .ok_or_else(|| LedgerError::NotFound(EntityKind::Payment).into())
}

async fn add_payment_in(
    txn: &TenantTxn,
    customer_id: Uuid,
    input: PaymentInput,
) -> Result<Uuid, RepoError> {
    let customer = load_customer(txn, customer_id).await?;

    let payment = customer_payments::ActiveModel {
        id: Set(Uuid::now_v7()),
        clinic_id: Set(txn.clinic_id().into_inner()),
        customer_id: Set(customer_id),
        date: Set(input.date.unwrap_or_else(|| Utc::now().date_naive())),
        amount: Set(input.amount),
        notes: Set(optional_text(input.notes)),
        created_at: Set(Utc::now()),
    }
    .insert(txn.conn())
    .await?;

    let mut balance = customer_balance(&customer)?;
    balance.add_payment(input.amount)?;
    write_customer_balance(txn, &customer, balance).await?;
    Ok(payment.id)
}

async fn update_payment_in(
    txn: &TenantTxn,
    customer_id: Uuid,
    payment_id: Uuid,
    input: PaymentInput,
) -> Result<(), RepoError> {
    let customer = load_customer(txn, customer_id).await?;
    let payment = load_payment(txn, customer_id, payment_id).await?;
    let old_amount = payment.amount;

    let mut active: customer_payments::ActiveModel = payment.into();
    if let Some(date) = input.date {
        active.date = Set(date);
    }
    active.amount = Set(input.amount);
    if let Some(notes) = input.notes {
        active.notes = Set(optional_text(Some(notes)));
    }
    active.update(txn.conn()).await?;

    let mut balance = customer_balance(&customer)?;
    balance.change_payment(old_amount, input.amount)?;
    write_customer_balance(txn, &customer, balance).await
}

async fn delete_payment_in(
    txn: &TenantTxn,
    customer_id: Uuid,
    payment_id: Uuid,
) -> Result<(), RepoError> {
    let customer = load_customer(txn, customer_id).await?;
    let payment = load_payment(txn, customer_id, payment_id).await?;

    txn.delete::<customer_payments::Entity>(payment.id).await?;

    let mut balance = customer_balance(&customer)?;
    balance.remove_payment(payment.amount)?;
    write_customer_balance(txn, &customer, balance).await
}

/// Returns the clinic's walk-in customer, creating it if needed.
pub(crate) async fn ensure_walk_in(txn: &TenantTxn) -> Result<customers::Model, RepoError> {
    let existing = txn
        .select::<customers::Entity>()
        .filter(customers::Column::Name.eq(WALK_IN_CUSTOMER_NAME))
        .one(txn.conn())
        .await?;
    if let Some(customer) = existing {
        return Ok(customer);
    }

    let candidate = new_customer(
        txn.clinic_id().into_inner(),
        WALK_IN_CUSTOMER_NAME.to_string(),
        None,
        None,
    );
    // A concurrent initializer may have inserted it first; retrying the
    // whole operation then finds that row.
    let customer = candidate.insert(txn.conn()).await.map_err(|e| {
        match conflict_on_duplicate(e, DUPLICATE_NAME) {
            RepoError::Ledger(_) => LedgerError::ConcurrentModification(Uuid::nil()).into(),
            other => other,
        }
    })?;

    info!(clinic_id = %txn.clinic_id(), customer_id = %customer.id, "Walk-in customer created");
    Ok(customer)
}

/// Resolves the customer a sale or treatment is booked against: the given
/// one, which must exist in this clinic, or the walk-in customer.
pub(crate) async fn resolve_customer(
    txn: &TenantTxn,
    customer_id: Option<Uuid>,
) -> Result<Uuid, RepoError> {
    match customer_id {
        Some(id) => Ok(load_customer(txn, id).await?.id),
        None => Ok(ensure_walk_in(txn).await?.id),
    }
}
