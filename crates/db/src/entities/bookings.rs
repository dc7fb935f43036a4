//! `SeaORM` Entity for the bookings table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BookingStatus, HostReviewStatus, SettlementState, TripStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    pub vehicle_id: Uuid,
    pub status: BookingStatus,
    pub trip_status: TripStatus,
    pub host_review_status: HostReviewStatus,
    pub settlement_state: SettlementState,
    pub deposit_amount: Decimal,
    pub deposit_from_wallet: Decimal,
    pub deposit_from_card: Decimal,
    pub deposit_used_for_claim: Decimal,
    pub deposit_refunded: Decimal,
    pub hold_deadline: Option<DateTimeWithTimeZone>,
    pub hold_reason: Option<String>,
    pub end_date: DateTimeWithTimeZone,
    pub trip_ended_at: Option<DateTimeWithTimeZone>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id"
    )]
    Vehicles,
    #[sea_orm(has_many = "super::claims::Entity")]
    Claims,
    #[sea_orm(has_many = "super::wallet_transactions::Entity")]
    WalletTransactions,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::claims::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Claims.def()
    }
}

impl Related<super::wallet_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
