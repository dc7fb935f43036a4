//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every mutating repository path appends its audit entry inside the same
//! database transaction as the domain write, so the chain never references
//! an event that did not happen.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AuditRepository, BookingRepository, ClaimError, ClaimRepository, HoldSweepService, NewBooking,
    PartnerRepository, SettlementOutcome, SettlementService, SweepReport, WalletError,
    WalletRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
