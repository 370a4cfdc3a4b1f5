//! Product repository.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use vetledger_core::ledger::{
    EntityKind, LedgerError, require_text, validate_on_hand, validate_price,
};

use crate::entities::products;
use crate::error::RepoError;
use crate::tenant::TenantDb;

/// Threshold at or below which a product shows up as low on stock.
pub const DEFAULT_MIN_LIMIT: i32 = 5;

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Initial quantity on hand (default 0).
    pub quantity: Option<i32>,
    /// Low-stock threshold (default 5).
    pub min_limit: Option<i32>,
    /// Expiry date of the current stock.
    pub expiry_date: Option<NaiveDate>,
}

/// Input for updating a product. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    /// Product name.
    pub name: Option<String>,
    /// Unit price.
    pub price: Option<Decimal>,
    /// Manual stock correction.
    pub quantity: Option<i32>,
    /// Low-stock threshold.
    pub min_limit: Option<i32>,
    /// Expiry date; `Some(None)` clears it.
    pub expiry_date: Option<Option<NaiveDate>>,
}

/// Repository for clinic products.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    tenant: TenantDb,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(tenant: TenantDb) -> Self {
        Self { tenant }
    }

    /// Lists the clinic's products by name.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list(&self) -> Result<Vec<products::Model>, RepoError> {
        let rows = self
            .tenant
            .select::<products::Entity>()
            .order_by_asc(products::Column::Name)
            .all(self.tenant.conn())
            .await?;
        Ok(rows)
    }

    /// Fetches one product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product is absent or belongs to another clinic.
    pub async fn get(&self, id: Uuid) -> Result<products::Model, RepoError> {
        self.tenant
            .find::<products::Entity>(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(EntityKind::Product).into())
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty name, negative price or quantity.
    pub async fn create(&self, input: CreateProductInput) -> Result<products::Model, RepoError> {
        let name = require_text("Name", &input.name)?;
        let price = validate_price(input.price)?;
        let quantity = validate_on_hand(input.quantity.unwrap_or(0))?;
        let min_limit = validate_min_limit(input.min_limit.unwrap_or(DEFAULT_MIN_LIMIT))?;

        let now = Utc::now();
        let product = products::ActiveModel {
            id: Set(Uuid::now_v7()),
            clinic_id: Set(self.tenant.clinic_id().into_inner()),
            name: Set(name),
            quantity: Set(quantity),
            min_limit: Set(min_limit),
            price: Set(price),
            expiry_date: Set(input.expiry_date),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.tenant.conn())
        .await?;

        info!(clinic_id = %self.tenant.clinic_id(), product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Updates a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product is not in this clinic, `Validation`
    /// for invalid fields and `ConcurrentModification` if a ledger write
    /// raced this update.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<products::Model, RepoError> {
        let product = self.get(id).await?;
        let version = product.version;
        let mut active: products::ActiveModel = product.into();

        if let Some(name) = &input.name {
            active.name = Set(require_text("Name", name)?);
        }
        if let Some(price) = input.price {
            active.price = Set(validate_price(price)?);
        }
        if let Some(quantity) = input.quantity {
            active.quantity = Set(validate_on_hand(quantity)?);
        }
        if let Some(min_limit) = input.min_limit {
            active.min_limit = Set(validate_min_limit(min_limit)?);
        }
        if let Some(expiry_date) = input.expiry_date {
            active.expiry_date = Set(expiry_date);
        }
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now());

        let result = products::Entity::update_many()
            .set(active)
            .filter(products::Column::Id.eq(id))
            .filter(products::Column::ClinicId.eq(self.tenant.clinic_id().into_inner()))
            .filter(products::Column::Version.eq(version))
            .exec(self.tenant.conn())
            .await?;
        if result.rows_affected == 0 {
            return Err(LedgerError::ConcurrentModification(id).into());
        }

        info!(clinic_id = %self.tenant.clinic_id(), product_id = %id, "Product updated");
        self.get(id).await
    }

    /// Deletes a product. Records that reference it keep their history and
    /// render it as deleted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product is not in this clinic.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if !self.tenant.delete::<products::Entity>(id).await? {
            return Err(LedgerError::NotFound(EntityKind::Product).into());
        }
        info!(clinic_id = %self.tenant.clinic_id(), product_id = %id, "Product deleted");
        Ok(())
    }
}

fn validate_min_limit(min_limit: i32) -> Result<i32, LedgerError> {
    if min_limit < 0 {
        return Err(LedgerError::validation("Minimum limit cannot be negative"));
    }
    Ok(min_limit)
}
