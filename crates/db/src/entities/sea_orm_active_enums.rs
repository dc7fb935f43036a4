//! Database enum types mirrored from the core domain enums.
//!
//! Conversions to and from the `rovia-core` enums live here so repository
//! code can hand pure snapshots to the business logic without string
//! round-trips.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking lifecycle status (`booking_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Trip is booked or underway.
    #[sea_orm(string_value = "active")]
    Active,
    /// Trip ended normally.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Provisional hold pending verification.
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    /// Host approved the deposit release.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Host filed a claim.
    #[sea_orm(string_value = "claim_filed")]
    ClaimFiled,
    /// Hold expired; deposit forfeited.
    #[sea_orm(string_value = "no_show")]
    NoShow,
    /// Cancelled before the trip.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Trip progress (`trip_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "trip_status")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Trip has not started.
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Guest has the vehicle.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Trip has ended.
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Host review decision state (`host_review_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "host_review_status")]
#[serde(rename_all = "snake_case")]
pub enum HostReviewStatus {
    /// Awaiting the host's decision.
    #[sea_orm(string_value = "pending_review")]
    PendingReview,
    /// Host approved the release.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Host filed a claim.
    #[sea_orm(string_value = "claim_filed")]
    ClaimFiled,
}

/// Money-movement state of an approved booking (`settlement_state`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "settlement_state")]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    /// No release attempted yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// All portions released and recorded.
    #[sea_orm(string_value = "settled")]
    Settled,
    /// Processor failure after approval; flagged for manual follow-up.
    #[sea_orm(string_value = "reconciliation_required")]
    ReconciliationRequired,
}

/// Wallet transaction type (`wallet_entry_type`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_entry_type")]
#[serde(rename_all = "snake_case")]
pub enum WalletEntryType {
    /// Deposit portion returned from a booking.
    #[sea_orm(string_value = "release")]
    Release,
    /// Amount taken out of the wallet.
    #[sea_orm(string_value = "deduct")]
    Deduct,
    /// Amount added to the wallet.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Claim lifecycle (`claim_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "claim_status")]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Filed by the host, not yet adjudicated.
    #[sea_orm(string_value = "filed")]
    Filed,
    /// Adjudicated with an approved deduction.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Withdrawn before adjudication.
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

/// Audit entry severity (`audit_severity`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_severity")]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Routine state transition.
    #[sea_orm(string_value = "info")]
    Info,
    /// Degraded outcome.
    #[sea_orm(string_value = "warning")]
    Warning,
    /// Integrity problem.
    #[sea_orm(string_value = "critical")]
    Critical,
}

// --- Conversions to/from the pure core enums ---

impl From<rovia_core::settlement::BookingStatus> for BookingStatus {
    fn from(value: rovia_core::settlement::BookingStatus) -> Self {
        use rovia_core::settlement::BookingStatus as Core;
        match value {
            Core::Active => Self::Active,
            Core::Completed => Self::Completed,
            Core::OnHold => Self::OnHold,
            Core::Approved => Self::Approved,
            Core::ClaimFiled => Self::ClaimFiled,
            Core::NoShow => Self::NoShow,
            Core::Cancelled => Self::Cancelled,
        }
    }
}

impl From<BookingStatus> for rovia_core::settlement::BookingStatus {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Active => Self::Active,
            BookingStatus::Completed => Self::Completed,
            BookingStatus::OnHold => Self::OnHold,
            BookingStatus::Approved => Self::Approved,
            BookingStatus::ClaimFiled => Self::ClaimFiled,
            BookingStatus::NoShow => Self::NoShow,
            BookingStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<rovia_core::settlement::TripStatus> for TripStatus {
    fn from(value: rovia_core::settlement::TripStatus) -> Self {
        use rovia_core::settlement::TripStatus as Core;
        match value {
            Core::Scheduled => Self::Scheduled,
            Core::InProgress => Self::InProgress,
            Core::Completed => Self::Completed,
        }
    }
}

impl From<TripStatus> for rovia_core::settlement::TripStatus {
    fn from(value: TripStatus) -> Self {
        match value {
            TripStatus::Scheduled => Self::Scheduled,
            TripStatus::InProgress => Self::InProgress,
            TripStatus::Completed => Self::Completed,
        }
    }
}

impl From<rovia_core::settlement::HostReviewStatus> for HostReviewStatus {
    fn from(value: rovia_core::settlement::HostReviewStatus) -> Self {
        use rovia_core::settlement::HostReviewStatus as Core;
        match value {
            Core::PendingReview => Self::PendingReview,
            Core::Approved => Self::Approved,
            Core::ClaimFiled => Self::ClaimFiled,
        }
    }
}

impl From<HostReviewStatus> for rovia_core::settlement::HostReviewStatus {
    fn from(value: HostReviewStatus) -> Self {
        match value {
            HostReviewStatus::PendingReview => Self::PendingReview,
            HostReviewStatus::Approved => Self::Approved,
            HostReviewStatus::ClaimFiled => Self::ClaimFiled,
        }
    }
}

impl From<rovia_core::settlement::SettlementState> for SettlementState {
    fn from(value: rovia_core::settlement::SettlementState) -> Self {
        use rovia_core::settlement::SettlementState as Core;
        match value {
            Core::Pending => Self::Pending,
            Core::Settled => Self::Settled,
            Core::ReconciliationRequired => Self::ReconciliationRequired,
        }
    }
}

impl From<SettlementState> for rovia_core::settlement::SettlementState {
    fn from(value: SettlementState) -> Self {
        match value {
            SettlementState::Pending => Self::Pending,
            SettlementState::Settled => Self::Settled,
            SettlementState::ReconciliationRequired => Self::ReconciliationRequired,
        }
    }
}

impl From<rovia_core::audit::AuditSeverity> for AuditSeverity {
    fn from(value: rovia_core::audit::AuditSeverity) -> Self {
        use rovia_core::audit::AuditSeverity as Core;
        match value {
            Core::Info => Self::Info,
            Core::Warning => Self::Warning,
            Core::Critical => Self::Critical,
        }
    }
}

impl From<AuditSeverity> for rovia_core::audit::AuditSeverity {
    fn from(value: AuditSeverity) -> Self {
        match value {
            AuditSeverity::Info => Self::Info,
            AuditSeverity::Warning => Self::Warning,
            AuditSeverity::Critical => Self::Critical,
        }
    }
}
