//! Notification service HTTP client. Fire-and-forget.

use async_trait::async_trait;

use rovia_core::external::notifier::{Notification, Notifier, NotifyError};
use rovia_shared::config::NotifierConfig;

/// HTTP client for the notification service.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    http: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &NotifierConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let url = format!("{}/v1/notifications", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&notification)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Delivery(format!(
                "notification service returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
