//! Traits for services that cross a process boundary.
//!
//! The payment processor and the notification service are the only
//! collaborators that may block or time out. They are specified here as
//! traits so the settlement and hold sweep services stay testable; HTTP
//! implementations live in the API crate.

pub mod notifier;
pub mod processor;

pub use notifier::{Notification, Notifier, NotifyError};
pub use processor::{PaymentProcessor, ProcessorError, RefundRecord};
