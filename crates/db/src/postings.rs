//! Stock and balance writes inside a tenant transaction.
//!
//! Each write reads the row, runs the core arithmetic and stores the result
//! with `version = read_version + 1`, guarded by `WHERE version =
//! read_version`. Zero affected rows means another writer got there first,
//! which surfaces as `ConcurrentModification` and makes
//! `TenantDb::atomically` retry the whole operation.
//!
//! Reversals of records whose product or party has since been deleted are
//! skipped with a warning; new effects against a missing product or party
//! are `NotFound`.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::warn;
use uuid::Uuid;
use vetledger_core::ledger::{
    Charge, CustomerBalance, CustomerCharge, EntityKind, LedgerError, StockMovement,
    SupplierBalance,
};

use crate::entities::{customers, products, suppliers};
use crate::error::RepoError;
use crate::tenant::TenantTxn;

/// Applies `movement` to a product, optionally overwriting its expiry date.
pub(crate) async fn apply_stock(
    txn: &TenantTxn,
    product_id: Uuid,
    movement: StockMovement,
    expiry: Option<NaiveDate>,
) -> Result<(), RepoError> {
    let product = txn
        .find::<products::Entity>(product_id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Product))?;
    write_stock(txn, &product, movement, expiry).await
}

/// Undoes `movement` previously applied to a product.
pub(crate) async fn reverse_stock(
    txn: &TenantTxn,
    product_id: Uuid,
    movement: StockMovement,
) -> Result<(), RepoError> {
    let Some(product) = txn.find::<products::Entity>(product_id).await? else {
        warn!(
            clinic_id = %txn.clinic_id(),
            %product_id,
            "Product no longer exists, skipping stock reversal"
        );
        return Ok(());
    };
    write_stock(txn, &product, movement.inverse(), None).await
}

async fn write_stock(
    txn: &TenantTxn,
    product: &products::Model,
    movement: StockMovement,
    expiry: Option<NaiveDate>,
) -> Result<(), RepoError> {
    let quantity = movement.apply(product.id, product.quantity)?;

    let mut update = products::Entity::update_many()
        .col_expr(products::Column::Quantity, Expr::value(quantity))
        .col_expr(products::Column::Version, Expr::value(product.version + 1))
        .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()));
    if let Some(expiry) = expiry {
        update = update.col_expr(products::Column::ExpiryDate, Expr::value(expiry));
    }

    let result = update
        .filter(products::Column::Id.eq(product.id))
        .filter(products::Column::ClinicId.eq(txn.clinic_id().into_inner()))
        .filter(products::Column::Version.eq(product.version))
        .exec(txn.conn())
        .await?;

    if result.rows_affected == 0 {
        return Err(LedgerError::ConcurrentModification(product.id).into());
    }
    Ok(())
}

/// Current balance of a customer row, with the rest recomputed.
pub(crate) fn customer_balance(
    customer: &customers::Model,
) -> Result<CustomerBalance, LedgerError> {
    CustomerBalance::from_totals(
        customer.total_sales,
        customer.total_treatments,
        customer.total_paid,
    )
}

/// Current balance of a supplier row, with the rest recomputed.
pub(crate) fn supplier_balance(
    supplier: &suppliers::Model,
) -> Result<SupplierBalance, LedgerError> {
    SupplierBalance::from_totals(supplier.total_purchases, supplier.total_paid)
}

/// Books a sale or treatment on a customer.
pub(crate) async fn charge_customer(
    txn: &TenantTxn,
    customer_id: Uuid,
    kind: CustomerCharge,
    charge: Charge,
) -> Result<(), RepoError> {
    let customer = txn
        .find::<customers::Entity>(customer_id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Customer))?;
    let mut balance = customer_balance(&customer)?;
    balance.apply(kind, charge)?;
    write_customer_balance(txn, &customer, balance).await
}

/// Removes a previously booked sale or treatment from a customer.
pub(crate) async fn uncharge_customer(
    txn: &TenantTxn,
    customer_id: Uuid,
    kind: CustomerCharge,
    charge: Charge,
) -> Result<(), RepoError> {
    let Some(customer) = txn.find::<customers::Entity>(customer_id).await? else {
        warn!(
            clinic_id = %txn.clinic_id(),
            %customer_id,
            "Customer no longer exists, skipping balance reversal"
        );
        return Ok(());
    };
    let mut balance = customer_balance(&customer)?;
    balance.reverse(kind, charge)?;
    write_customer_balance(txn, &customer, balance).await
}

/// Stores a customer's totals.
pub(crate) async fn write_customer_balance(
    txn: &TenantTxn,
    customer: &customers::Model,
    balance: CustomerBalance,
) -> Result<(), RepoError> {
    let result = customers::Entity::update_many()
        .col_expr(customers::Column::TotalSales, Expr::value(balance.total_sales))
        .col_expr(customers::Column::TotalTreatments, Expr::value(balance.total_treatments))
        .col_expr(customers::Column::TotalPaid, Expr::value(balance.total_paid))
        .col_expr(customers::Column::TotalRest, Expr::value(balance.total_rest))
        .col_expr(customers::Column::Version, Expr::value(customer.version + 1))
        .col_expr(customers::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(customers::Column::Id.eq(customer.id))
        .filter(customers::Column::ClinicId.eq(txn.clinic_id().into_inner()))
        .filter(customers::Column::Version.eq(customer.version))
        .exec(txn.conn())
        .await?;

    if result.rows_affected == 0 {
        return Err(LedgerError::ConcurrentModification(customer.id).into());
    }
    Ok(())
}

/// Books a purchase on a supplier.
pub(crate) async fn charge_supplier(
    txn: &TenantTxn,
    supplier_id: Uuid,
    charge: Charge,
) -> Result<(), RepoError> {
    let supplier = txn
        .find::<suppliers::Entity>(supplier_id)
        .await?
        .ok_or(LedgerError::NotFound(EntityKind::Supplier))?;
    let mut balance = supplier_balance(&supplier)?;
    balance.apply(charge)?;
    write_supplier_balance(txn, &supplier, balance).await
}

/// Removes a previously booked purchase from a supplier.
pub(crate) async fn uncharge_supplier(
    txn: &TenantTxn,
    supplier_id: Uuid,
    charge: Charge,
) -> Result<(), RepoError> {
    let Some(supplier) = txn.find::<suppliers::Entity>(supplier_id).await? else {
        warn!(
            clinic_id = %txn.clinic_id(),
            %supplier_id,
            "Supplier no longer exists, skipping balance reversal"
        );
        return Ok(());
    };
    let mut balance = supplier_balance(&supplier)?;
    balance.reverse(charge)?;
    write_supplier_balance(txn, &supplier, balance).await
}

/// Stores a supplier's totals.
pub(crate) async fn write_supplier_balance(
    txn: &TenantTxn,
    supplier: &suppliers::Model,
    balance: SupplierBalance,
) -> Result<(), RepoError> {
    let result = suppliers::Entity::update_many()
        .col_expr(suppliers::Column::TotalPurchases, Expr::value(balance.total_purchases))
        .col_expr(suppliers::Column::TotalPaid, Expr::value(balance.total_paid))
        .col_expr(suppliers::Column::TotalRest, Expr::value(balance.total_rest))
        .col_expr(suppliers::Column::Version, Expr::value(supplier.version + 1))
        .col_expr(suppliers::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(suppliers::Column::Id.eq(supplier.id))
        .filter(suppliers::Column::ClinicId.eq(txn.clinic_id().into_inner()))
        .filter(suppliers::Column::Version.eq(supplier.version))
        .exec(txn.conn())
        .await?;

    if result.rows_affected == 0 {
        return Err(LedgerError::ConcurrentModification(supplier.id).into());
    }
    Ok(())
}
