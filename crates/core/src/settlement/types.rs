//! Settlement domain types.
//!
//! Status fields are closed enums with exhaustive handling at every
//! transition site, so an unhandled state is a compile-time error rather
//! than a runtime surprise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Trip is booked or underway.
    Active,
    /// Trip ended normally; deposit settlement may proceed.
    Completed,
    /// Provisional hold pending guest verification, with a deadline.
    OnHold,
    /// Host approved the deposit release.
    Approved,
    /// Host filed a damage/loss claim against the deposit.
    ClaimFiled,
    /// Hold expired past both deadlines; deposit forfeited (terminal).
    NoShow,
    /// Booking cancelled before the trip (terminal).
    Cancelled,
}

impl BookingStatus {
    /// Returns true if no further settlement activity is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoShow | Self::Cancelled)
    }

    /// Returns the string representation used in logs and API responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Approved => "approved",
            Self::ClaimFiled => "claim_filed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip progress, independent of settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Trip has not started.
    Scheduled,
    /// Guest has picked up the vehicle.
    InProgress,
    /// Trip has ended (normally or by forfeiture).
    Completed,
}

impl TripStatus {
    /// Returns the string representation used in logs and API responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The host's final review decision state for a completed trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostReviewStatus {
    /// Awaiting the host's decision.
    PendingReview,
    /// Host approved; deposit release executed (or pending reconciliation).
    Approved,
    /// Host filed a claim; deposit held until the claim resolves.
    ClaimFiled,
}

impl HostReviewStatus {
    /// Returns true if a decision has been recorded.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::PendingReview)
    }

    /// Returns the string representation used in logs and API responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::ClaimFiled => "claim_filed",
        }
    }
}

impl std::fmt::Display for HostReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an approved booking stands with respect to money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    /// No release has been attempted yet.
    Pending,
    /// All portions released and recorded.
    Settled,
    /// The processor call failed after the approval was committed;
    /// flagged for manual follow-up, never auto-retried.
    ReconciliationRequired,
}

impl SettlementState {
    /// Returns the string representation used in logs and API responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
            Self::ReconciliationRequired => "reconciliation_required",
        }
    }
}

impl std::fmt::Display for SettlementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision a host can make on a completed trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Release the deposit.
    Approve,
    /// Hold the deposit pending claim adjudication.
    FileClaim,
}

/// A validated review transition, ready to be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewAction {
    /// The decision being recorded.
    pub decision: ReviewDecision,
    /// The review status the booking moves to.
    pub new_review_status: HostReviewStatus,
    /// The booking status the booking moves to.
    pub new_booking_status: BookingStatus,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_terminal() {
        assert!(BookingStatus::NoShow.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Completed.is_terminal());
        assert!(!BookingStatus::OnHold.is_terminal());
        assert!(!BookingStatus::Approved.is_terminal());
    }

    #[test]
    fn test_review_status_decided() {
        assert!(!HostReviewStatus::PendingReview.is_decided());
        assert!(HostReviewStatus::Approved.is_decided());
        assert!(HostReviewStatus::ClaimFiled.is_decided());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(BookingStatus::OnHold.to_string(), "on_hold");
        assert_eq!(HostReviewStatus::PendingReview.to_string(), "pending_review");
        assert_eq!(
            SettlementState::ReconciliationRequired.to_string(),
            "reconciliation_required"
        );
    }
}
