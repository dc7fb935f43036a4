//! `SeaORM` Entity for the wallet_transactions table (append-only).

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::WalletEntryType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub wallet_account_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub entry_type: WalletEntryType,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub reason: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallet_accounts::Entity",
        from = "Column::WalletAccountId",
        to = "super::wallet_accounts::Column::Id"
    )]
    WalletAccounts,
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
}

impl Related<super::wallet_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletAccounts.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
