//! Portwatch - TCP reachability monitoring with alert routing
//!
//! Endpoints are probed concurrently on a fixed interval. When an endpoint
//! changes from reachable to unreachable (or back), every destination whose
//! filter matches that endpoint receives an alert.

mod fault;
pub mod monitoring;
pub mod notify;

pub use monitoring::{
    CycleReport, CycleRunner, CycleScheduler, EndpointConfig, ProbeResult, Prober, SchedulerSettings,
    StatusStore, TcpProber, TransitionEvent,
};
pub use notify::{DeliveryOutcome, Destination, DestinationConfig, DestinationRouter, Notifier};

/// Re-exported so callers can build a shutdown signal without a direct dependency
pub use tokio_util::sync::CancellationToken;
