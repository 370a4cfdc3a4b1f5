//! `SeaORM` Entity for opening_stocks table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "opening_stocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub expiry_date: Option<Date>,
    pub source: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub price: Option<Decimal>,
    pub opening_date: Date,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

crate::tenant::clinic_owned!(Entity);
