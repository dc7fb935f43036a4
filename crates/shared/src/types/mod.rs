//! Shared domain types.

pub mod money;

pub use money::{MoneyError, to_minor_units};
