/// Monitoring engine - probes endpoints and tracks their reachability
///
/// This module is responsible for:
/// - Bounded-time TCP probes
/// - Concurrent probe cycles
/// - Remembering the last result per endpoint and deriving transitions
/// - Driving cycles on a fixed interval
pub mod checker;
pub mod runner;
pub mod scheduler;
pub mod status;
pub mod types;

pub use checker::{ProbeError, Prober, TcpProber};
pub use runner::CycleRunner;
pub use scheduler::{CycleReport, CycleScheduler, SchedulerSettings};
pub use status::StatusStore;
pub use types::{EndpointConfig, MonitorStatus, ProbeResult, TransitionEvent};
