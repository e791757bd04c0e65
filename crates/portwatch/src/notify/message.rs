//! Alert text for reachability transitions.

use chrono::{DateTime, Utc};

use super::types::{Notification, Severity};
use crate::monitoring::{ProbeResult, TransitionEvent};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the alert for `event`, or `None` if reachability did not change.
pub fn for_event(event: &TransitionEvent) -> Option<Notification> {
    if event.went_down() {
        Some(endpoint_down(&event.current))
    } else if event.came_up() {
        Some(endpoint_up(&event.current))
    } else {
        None
    }
}

pub fn endpoint_down(result: &ProbeResult) -> Notification {
    let title = format!("🔴 Server Down: {}", result.endpoint);
    let message = format!(
        "Server '{}' is DOWN\n\n⏰ Detected at: {} UTC\n❌ Error: {}",
        result.endpoint,
        format_timestamp(&result.timestamp),
        result.error_message.as_deref().unwrap_or("Connection failed"),
    );

    Notification { title, message, priority: Severity::High.priority() }
}

pub fn endpoint_up(result: &ProbeResult) -> Notification {
    let title = format!("🟢 Server Up: {}", result.endpoint);
    let message = format!(
        "Server {} ({}:{}) is back UP\n\n⏰ Restored at: {} UTC\n⚡ Response time: {:.2}ms",
        result.endpoint,
        result.host,
        result.port,
        format_timestamp(&result.timestamp),
        result.latency_ms(),
    );

    Notification { title, message, priority: Severity::Normal.priority() }
}
