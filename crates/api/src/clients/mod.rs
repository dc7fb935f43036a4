//! HTTP implementations of the external-service traits.

pub mod notifier;
pub mod processor;

pub use notifier::HttpNotifier;
pub use processor::HttpPaymentProcessor;
