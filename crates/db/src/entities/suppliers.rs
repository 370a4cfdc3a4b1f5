//! `SeaORM` Entity for suppliers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_purchases: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_paid: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_rest: Decimal,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::supplier_payments::Entity")]
    SupplierPayments,
}

impl Related<super::supplier_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplierPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

crate::tenant::clinic_owned!(Entity, named);
