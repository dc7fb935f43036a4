//! `SeaORM` Entity for the partners table.
//!
//! Tier threshold/rate columns are per-partner overrides; NULL means the
//! platform default applies.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub fleet_size: i32,
    pub commission_rate: Decimal,
    pub tier1_min: Option<i32>,
    pub tier2_min: Option<i32>,
    pub tier3_min: Option<i32>,
    pub base_rate: Option<Decimal>,
    pub tier1_rate: Option<Decimal>,
    pub tier2_rate: Option<Decimal>,
    pub tier3_rate: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicles::Entity")]
    Vehicles,
    #[sea_orm(has_many = "super::commission_history::Entity")]
    CommissionHistory,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::commission_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommissionHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
