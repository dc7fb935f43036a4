//! Notification service boundary.
//!
//! Fire-and-forget: delivery failures are logged by the caller and never
//! block or roll back a domain transition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the notification boundary.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The delivery call failed.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// A notification to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The user to notify.
    pub recipient: Uuid,
    /// Template identifier, e.g. "deposit_released", "hold_forfeited".
    pub template: String,
    /// Template data.
    pub data: serde_json::Value,
}

/// External notification service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Best effort only.
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_notifier() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.template == "deposit_released")
            .times(1)
            .returning(|_| Ok(()));

        let result = notifier
            .notify(Notification {
                recipient: Uuid::new_v4(),
                template: "deposit_released".to_string(),
                data: json!({ "amount": "350" }),
            })
            .await;
        assert!(result.is_ok());
    }
}
