//! Webhook delivery.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::notifier::ActivationPayload;
use crate::notifications::{ActivationNotice, NotifyError, Notifier};

/// Posts each notice as JSON to a fixed endpoint, leaving rendering and mail
/// delivery to the receiver.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    http: Client,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.url)
            .json(&ActivationPayload::from(notice))
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            return Err(NotifyError::Rejected(format!(
                "webhook responded with status {status}: {text}"
            )));
        }

        debug!(user_id = %notice.user_id, %status, "activation notice delivered");

        Ok(())
    }
}
