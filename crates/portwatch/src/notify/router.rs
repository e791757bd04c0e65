use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::gotify::{GotifyNotifier, Notifier};
use super::message;
use super::types::{DeliveryError, DeliveryOutcome, DestinationConfig, Notification};
use crate::fault::panic_message;
use crate::monitoring::TransitionEvent;

/// A configured destination bound to the sink that delivers to it
#[derive(Clone)]
pub struct Destination {
    config: DestinationConfig,
    notifier: Arc<dyn Notifier>,
}

impl Destination {
    pub fn new(config: DestinationConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    /// Destination delivering to a Gotify server with the shared `client`
    pub fn gotify(client: reqwest::Client, config: DestinationConfig) -> Self {
        let notifier = Arc::new(GotifyNotifier::new(client, &config));
        Self::new(config, notifier)
    }

    pub fn name(&self) -> &str {
        self.config.display_name()
    }

    async fn deliver(&self, notification: &Notification) -> DeliveryOutcome {
        let result = match AssertUnwindSafe(self.notifier.send(notification)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(DeliveryError::Fault(panic_message(payload.as_ref()))),
        };

        match &result {
            Ok(()) => info!("Sent notification to {}: {}", self.name(), notification.title),
            Err(e) => warn!("Failed to send notification to {}: {}", self.name(), e),
        }

        DeliveryOutcome { destination: self.name().to_string(), result }
    }
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Destination").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Fans transition alerts out to the destinations whose filter matches
#[derive(Debug, Clone, Default)]
pub struct DestinationRouter {
    destinations: Vec<Destination>,
}

impl DestinationRouter {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self { destinations }
    }

    /// Build a router with one Gotify destination per config entry
    pub fn gotify(client: &reqwest::Client, configs: impl IntoIterator<Item = DestinationConfig>) -> Self {
        Self::new(configs.into_iter().map(|config| Destination::gotify(client.clone(), config)).collect())
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Destinations that should be alerted about `endpoint_name`
    pub fn applicable(&self, endpoint_name: &str) -> Vec<&Destination> {
        self.destinations
            .iter()
            .filter(|destination| destination.config.applies_to(endpoint_name))
            .collect()
    }

    /// Alert every applicable destination about `event`.
    ///
    /// Does nothing unless reachability changed. Deliveries run concurrently
    /// and each failure is contained in its own outcome.
    pub async fn route(&self, event: &TransitionEvent) -> Vec<DeliveryOutcome> {
        let Some(notification) = message::for_event(event) else {
            return Vec::new();
        };

        let targets = self.applicable(event.endpoint());
        if targets.is_empty() {
            debug!("No destinations configured for {}, skipping alert", event.endpoint());
            return Vec::new();
        }

        debug!(
            "Routing \"{}\" to {} destination(s)",
            notification.title,
            targets.len()
        );

        join_all(targets.into_iter().map(|destination| destination.deliver(&notification))).await
    }

    /// Route several events concurrently; outcomes are flattened in event order.
    pub async fn route_all(&self, events: &[TransitionEvent]) -> Vec<DeliveryOutcome> {
        join_all(events.iter().map(|event| self.route(event))).await.into_iter().flatten().collect()
    }
}
