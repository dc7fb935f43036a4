//! Tamper-evident audit chain construction and verification.
//!
//! Every mutating event is recorded as an entry whose hash depends on its
//! canonicalized payload and the previous entry's hash, chained per
//! (resource, resource id) scope. Undetected retroactive edits are
//! infeasible; verification walks the chain recomputing every hash.

pub mod chain;
pub mod error;
pub mod types;

#[cfg(test)]
mod chain_props;

pub use chain::{canonical_json, chain_hash, verify};
pub use error::AuditError;
pub use types::{AuditEvent, AuditSeverity, ChainEntry, ChainReport};
