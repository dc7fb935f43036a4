//! Commission engine error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when building a tier schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommissionError {
    /// Tier thresholds are not strictly increasing.
    #[error("Tier thresholds must be strictly increasing: {tier1} / {tier2} / {tier3}")]
    ThresholdsNotIncreasing {
        /// Tier 1 minimum fleet size.
        tier1: i32,
        /// Tier 2 minimum fleet size.
        tier2: i32,
        /// Tier 3 minimum fleet size.
        tier3: i32,
    },

    /// A rate is outside the inclusive range [0, 1].
    #[error("Commission rate {0} must be between 0 and 1")]
    RateOutOfRange(Decimal),

    /// Partner not found.
    #[error("Partner not found: {0}")]
    PartnerNotFound(uuid::Uuid),

    /// Vehicle not found.
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(uuid::Uuid),

    /// Audit chain failure during recording.
    #[error(transparent)]
    Audit(#[from] crate::audit::AuditError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CommissionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ThresholdsNotIncreasing { .. } | Self::RateOutOfRange(_) => 400,
            Self::PartnerNotFound(_) | Self::VehicleNotFound(_) => 404,
            Self::Audit(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ThresholdsNotIncreasing { .. } => "TIER_THRESHOLDS_NOT_INCREASING",
            Self::RateOutOfRange(_) => "COMMISSION_RATE_OUT_OF_RANGE",
            Self::PartnerNotFound(_) => "PARTNER_NOT_FOUND",
            Self::VehicleNotFound(_) => "VEHICLE_NOT_FOUND",
            Self::Audit(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
