//! Settlement error types.

use thiserror::Error;

use crate::settlement::types::{BookingStatus, HostReviewStatus};

/// Errors that can occur during settlement review transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// The review decision was already recorded. A repeat call should
    /// return the prior terminal state, not re-execute side effects.
    #[error("Review already decided: {review_status}")]
    AlreadyDecided {
        /// The terminal review status already recorded.
        review_status: HostReviewStatus,
    },

    /// The booking is not in a settleable state.
    #[error("Booking in status {status} with review {review_status} is not eligible for settlement")]
    NotEligible {
        /// The booking status observed.
        status: BookingStatus,
        /// The review status observed.
        review_status: HostReviewStatus,
    },

    /// The reduced net deposit cannot be released while claims are still
    /// being adjudicated or have unapplied deductions.
    #[error("Booking {booking_id} has {open_claims} unresolved claim(s)")]
    ClaimsUnresolved {
        /// The booking whose release was requested.
        booking_id: uuid::Uuid,
        /// Claims still filed, or approved but not yet applied.
        open_claims: usize,
    },

    /// The precondition no longer held at commit time (lost a race).
    #[error("Settlement precondition no longer holds for this booking")]
    PreconditionFailed,

    /// Booking not found.
    #[error("Booking not found: {0}")]
    BookingNotFound(uuid::Uuid),

    /// The booking's stored deposit figures violate a ledger invariant.
    #[error(transparent)]
    Deposit(#[from] crate::deposit::DepositError),

    /// Audit chain failure during recording.
    #[error(transparent)]
    Audit(#[from] crate::audit::AuditError),

    /// A money amount could not be converted to minor units.
    #[error("Amount conversion failed: {0}")]
    Amount(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl SettlementError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AlreadyDecided { .. }
            | Self::NotEligible { .. }
            | Self::ClaimsUnresolved { .. }
            | Self::PreconditionFailed => 409,
            Self::BookingNotFound(_) => 404,
            Self::Deposit(e) => e.status_code(),
            Self::Audit(e) => e.status_code(),
            Self::Amount(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyDecided { .. } => "REVIEW_ALREADY_DECIDED",
            Self::NotEligible { .. } => "BOOKING_NOT_ELIGIBLE",
            Self::ClaimsUnresolved { .. } => "CLAIMS_UNRESOLVED",
            Self::PreconditionFailed => "CONCURRENCY_CONFLICT",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::Deposit(e) => e.error_code(),
            Self::Audit(e) => e.error_code(),
            Self::Amount(_) => "AMOUNT_CONVERSION_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_decided_error() {
        let err = SettlementError::AlreadyDecided {
            review_status: HostReviewStatus::Approved,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "REVIEW_ALREADY_DECIDED");
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_not_eligible_error() {
        let err = SettlementError::NotEligible {
            status: BookingStatus::OnHold,
            review_status: HostReviewStatus::PendingReview,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "BOOKING_NOT_ELIGIBLE");
        assert!(err.to_string().contains("on_hold"));
    }

    #[test]
    fn test_claims_unresolved_error() {
        let err = SettlementError::ClaimsUnresolved {
            booking_id: uuid::Uuid::nil(),
            open_claims: 2,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CLAIMS_UNRESOLVED");
        assert!(err.to_string().contains("2 unresolved"));
    }

    #[test]
    fn test_precondition_failed_error() {
        let err = SettlementError::PreconditionFailed;
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONCURRENCY_CONFLICT");
    }
}
