//! Hold expiry error types.

use thiserror::Error;

use crate::settlement::BookingStatus;

/// Errors that can occur during hold expiry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HoldError {
    /// The booking does not satisfy the expiry rule.
    #[error("Booking in status {status} is not expirable")]
    NotExpirable {
        /// The booking status observed.
        status: BookingStatus,
    },

    /// The booking carries no hold deadline to expire against.
    #[error("Booking has no hold deadline")]
    NoDeadline,

    /// Audit chain failure during recording.
    #[error(transparent)]
    Audit(#[from] crate::audit::AuditError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl HoldError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotExpirable { .. } | Self::NoDeadline => 409,
            Self::Audit(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotExpirable { .. } => "BOOKING_NOT_EXPIRABLE",
            Self::NoDeadline => "NO_HOLD_DEADLINE",
            Self::Audit(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
