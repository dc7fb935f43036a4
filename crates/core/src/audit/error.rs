//! Audit chain error types.

use thiserror::Error;

/// Errors that can occur against an audit chain scope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditError {
    /// The scope's chain failed verification; no further appends allowed
    /// until an operator resolves the fault.
    #[error("Audit chain for {resource}/{resource_id} is broken at seq {first_bad_seq}: {detail}")]
    ChainBroken {
        /// Resource kind.
        resource: String,
        /// Resource identifier.
        resource_id: String,
        /// First failing sequence number.
        first_bad_seq: i64,
        /// What failed.
        detail: String,
    },

    /// Appends to this scope are halted by a recorded fault.
    #[error("Audit chain for {resource}/{resource_id} is halted pending manual resolution")]
    ChainHalted {
        /// Resource kind.
        resource: String,
        /// Resource identifier.
        resource_id: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AuditError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ChainBroken { .. } | Self::ChainHalted { .. } | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ChainBroken { .. } => "AUDIT_CHAIN_BROKEN",
            Self::ChainHalted { .. } => "AUDIT_CHAIN_HALTED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
