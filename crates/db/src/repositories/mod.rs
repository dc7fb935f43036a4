//! Repository layer for data access.
//!
//! Each repository owns one aggregate and its audit scope. The invariant
//! shared by all of them: a domain write and its audit entry commit in the
//! same database transaction, and every status transition is guarded by a
//! conditional update so a lost race surfaces as a conflict instead of a
//! double execution.

pub mod audit;
pub mod booking;
pub mod claim;
pub mod hold;
pub mod partner;
pub mod settlement;
pub mod wallet;

pub use audit::AuditRepository;
pub use booking::{BookingRepository, NewBooking};
pub use claim::{ClaimError, ClaimRepository};
pub use hold::{HoldSweepService, SweepReport};
pub use partner::PartnerRepository;
pub use settlement::{SettlementOutcome, SettlementService};
pub use wallet::{WalletError, WalletRepository};
