//! Shared types and configuration for Rovia.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers with decimal precision and minor-unit conversion
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
