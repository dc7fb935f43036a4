//! `SeaORM` entity definitions.

pub mod audit_chain_faults;
pub mod audit_log;
pub mod bookings;
pub mod claims;
pub mod commission_history;
pub mod partners;
pub mod sea_orm_active_enums;
pub mod vehicles;
pub mod wallet_accounts;
pub mod wallet_transactions;
