use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reachability of an endpoint as seen by a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Up,
    Down,
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::Up => write!(f, "UP"),
            MonitorStatus::Down => write!(f, "DOWN"),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A monitored `host:port` target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Unique, human readable name used in alerts and destination allow-lists
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl EndpointConfig {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self { name: name.into(), host: host.into(), port, enabled: true }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Identity of the endpoint in the status store
    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outcome of one TCP probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Name of the endpoint that was probed
    pub endpoint: String,

    pub host: String,

    pub port: u16,

    /// Whether the connection was established in time
    pub reachable: bool,

    /// When the probe was started
    pub timestamp: DateTime<Utc>,

    /// Failure description, present iff `reachable` is false
    pub error_message: Option<String>,

    /// Time spent on the connection attempt
    pub latency: Duration,
}

impl ProbeResult {
    /// Create an unresolved result for `endpoint`, stamped with the current time
    pub fn new(endpoint: &EndpointConfig) -> Self {
        Self {
            endpoint: endpoint.name.clone(),
            host: endpoint.host.clone(),
            port: endpoint.port,
            reachable: false,
            timestamp: Utc::now(),
            error_message: None,
            latency: Duration::ZERO,
        }
    }

    /// Mark the endpoint as reachable
    pub fn success(mut self, latency: Duration) -> Self {
        self.reachable = true;
        self.error_message = None;
        self.latency = latency;
        self
    }

    /// Mark the endpoint as unreachable
    pub fn failure(mut self, error: impl Into<String>, latency: Duration) -> Self {
        self.reachable = false;
        self.error_message = Some(error.into());
        self.latency = latency;
        self
    }

    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn status(&self) -> MonitorStatus {
        if self.reachable { MonitorStatus::Up } else { MonitorStatus::Down }
    }

    /// Latency in fractional milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

/// Comparison of an endpoint's current result with the one from the previous cycle
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub current: ProbeResult,
    /// `None` on the first observation of the endpoint
    pub previous: Option<ProbeResult>,
}

impl TransitionEvent {
    pub fn new(current: ProbeResult, previous: Option<ProbeResult>) -> Self {
        Self { current, previous }
    }

    pub fn endpoint(&self) -> &str {
        &self.current.endpoint
    }

    /// True when reachability flipped since the previous cycle
    pub fn is_transition(&self) -> bool {
        self.previous
            .as_ref()
            .is_some_and(|previous| previous.reachable != self.current.reachable)
    }

    pub fn went_down(&self) -> bool {
        self.previous.as_ref().is_some_and(|previous| previous.reachable) && !self.current.reachable
    }

    pub fn came_up(&self) -> bool {
        self.previous.as_ref().is_some_and(|previous| !previous.reachable) && self.current.reachable
    }
}
