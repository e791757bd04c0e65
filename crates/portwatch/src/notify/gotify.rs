use tracing::debug;

use super::types::{DeliveryError, DestinationConfig, Notification};

/// Sink for a single alert destination
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `notification`. Any non-2xx response is an error.
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Delivers alerts to a Gotify server through its `/message` endpoint
#[derive(Debug, Clone)]
pub struct GotifyNotifier {
    client: reqwest::Client,
    message_url: String,
    token: String,
}

impl GotifyNotifier {
    /// The client is shared across destinations; it owns timeouts and pooling.
    pub fn new(client: reqwest::Client, config: &DestinationConfig) -> Self {
        Self {
            client,
            message_url: format!("{}/message", config.base_url.trim_end_matches('/')),
            token: config.token.clone(),
        }
    }

    pub fn message_url(&self) -> &str {
        &self.message_url
    }
}

#[async_trait::async_trait]
impl Notifier for GotifyNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        debug!("Sending Gotify notification: {}", notification.title);

        let response = self
            .client
            .post(&self.message_url)
            .query(&[("token", self.token.as_str())])
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Status { status: status.as_u16(), body })
    }
}
