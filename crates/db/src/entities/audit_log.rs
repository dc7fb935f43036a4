//! `SeaORM` Entity for the append-only audit_log table.
//!
//! Rows form a hash chain per resource: `hash` commits to the canonical
//! event payload plus `previous_hash`, and `seq` is dense starting at 1.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AuditSeverity;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub resource: String,
    pub resource_id: Uuid,
    pub seq: i64,
    pub category: String,
    pub event_type: String,
    pub severity: AuditSeverity,
    pub action: String,
    pub amount: Option<Decimal>,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,
    pub hash: String,
    pub previous_hash: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
