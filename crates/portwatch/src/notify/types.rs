use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    5
}

/// An alert destination and the endpoints it cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Display name; the base URL is shown when absent
    #[serde(default)]
    pub name: Option<String>,

    pub base_url: String,

    /// Application token sent as the `token` query parameter
    pub token: String,

    /// Base priority of the destination. Alerts carry their own priority, so
    /// this value is informational only.
    #[serde(default = "default_priority")]
    pub priority: i32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Receive alerts for every endpoint, ignoring `monitored_endpoints`
    #[serde(default)]
    pub monitor_all: bool,

    /// Endpoint names this destination receives alerts for
    #[serde(default)]
    pub monitored_endpoints: Vec<String>,
}

impl DestinationConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: None,
            base_url: base_url.into(),
            token: token.into(),
            priority: default_priority(),
            enabled: true,
            monitor_all: false,
            monitored_endpoints: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn monitoring_all(mut self) -> Self {
        self.monitor_all = true;
        self
    }

    pub fn monitoring<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.monitored_endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.base_url,
        }
    }

    /// Whether an alert about `endpoint_name` should be sent here.
    ///
    /// Allow-list entries and the endpoint name are compared trimmed and
    /// case-insensitively. An empty allow-list without `monitor_all` opts out
    /// of every endpoint.
    pub fn applies_to(&self, endpoint_name: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if self.monitor_all {
            return true;
        }

        let endpoint_name = endpoint_name.trim().to_lowercase();
        self.monitored_endpoints
            .iter()
            .any(|entry| entry.trim().to_lowercase() == endpoint_name)
    }
}

/// Urgency of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Normal,
}

impl Severity {
    /// Priority value sent on the wire
    pub fn priority(self) -> i32 {
        match self {
            Severity::High => 8,
            Severity::Normal => 3,
        }
    }
}

/// Alert payload, serialized as the JSON request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub priority: i32,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("destination responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("delivery failed unexpectedly: {0}")]
    Fault(String),
}

/// Result of sending one alert to one destination
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub destination: String,
    pub result: Result<(), DeliveryError>,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}
