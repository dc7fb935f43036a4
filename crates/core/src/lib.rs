//! Core business logic for Rovia.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, invariant checks, and calculations
//! live here.
//!
//! # Modules
//!
//! - `deposit` - Deposit ledger arithmetic (funding split, net release)
//! - `settlement` - Host-review state machine for deposit settlement
//! - `commission` - Fleet-size commission tier engine
//! - `audit` - Tamper-evident hash chain construction and verification
//! - `hold` - Hold expiry rules for provisional bookings
//! - `external` - Traits for the payment processor and notifier boundaries

pub mod audit;
pub mod commission;
pub mod deposit;
pub mod external;
pub mod hold;
pub mod settlement;
