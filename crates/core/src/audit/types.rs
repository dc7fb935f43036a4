//! Audit chain domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Severity of an audited event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Routine state transition.
    Info,
    /// Degraded outcome (e.g. a failed external call).
    Warning,
    /// Integrity problem requiring operator attention.
    Critical,
}

impl AuditSeverity {
    /// Returns the string representation stored and hashed.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload of an audit entry, before hashing.
///
/// The hash covers every field here via canonical JSON, so any field edit
/// after the fact breaks the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Coarse grouping, e.g. "settlement", "commission", "hold".
    pub category: String,
    /// Specific event, e.g. "deposit_released", "rate_changed".
    pub event_type: String,
    /// Severity of the event.
    pub severity: AuditSeverity,
    /// Human-readable action summary.
    pub action: String,
    /// Money amount involved, if any.
    pub amount: Option<Decimal>,
    /// Structured context (booking ids, portions, idempotency keys).
    pub metadata: serde_json::Value,
}

impl AuditEvent {
    /// Serializes the event to the canonical JSON form that gets hashed.
    #[must_use]
    pub fn canonical_payload(&self) -> String {
        // Serialization of this struct cannot fail: no maps with non-string
        // keys, no non-finite floats.
        let value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        super::chain::canonical_json(&value)
    }
}

/// A stored chain entry, as read back for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainEntry {
    /// Position within the (resource, resource id) scope, as stored.
    pub seq: i64,
    /// The stored payload.
    pub event: AuditEvent,
    /// The stored hash.
    pub hash: String,
    /// The stored previous hash (None for the first entry).
    pub previous_hash: Option<String>,
}

/// Outcome of verifying one scope's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainReport {
    /// Every entry verified.
    Valid {
        /// Number of entries walked.
        entries: usize,
    },
    /// Verification failed at an entry; writes to this scope must halt.
    Broken {
        /// Sequence number of the first failing entry.
        first_bad_seq: i64,
        /// What failed at that entry.
        detail: String,
    },
}

impl ChainReport {
    /// Returns true if the chain verified end to end.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}
