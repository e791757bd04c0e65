use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::runner::CycleRunner;
use super::status::StatusStore;
use super::types::EndpointConfig;
use crate::fault::panic_message;
use crate::notify::DestinationRouter;

/// Timing of the monitoring loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Pause between the end of one cycle and the start of the next
    pub check_interval: Duration,
    /// Upper bound for a single connection attempt
    pub probe_timeout: Duration,
    /// Pause before the first cycle
    pub startup_delay: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(30),
            startup_delay: Duration::from_secs(5),
        }
    }
}

/// Counters describing one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub probed: usize,
    pub up: usize,
    pub down: usize,
    pub transitions: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

/// Drives probe, diff and routing on a fixed interval
#[derive(Debug)]
pub struct CycleScheduler {
    runner: CycleRunner,
    store: StatusStore,
    router: DestinationRouter,
    endpoints: Vec<EndpointConfig>,
    settings: SchedulerSettings,
}

impl CycleScheduler {
    pub fn new(
        runner: CycleRunner,
        store: StatusStore,
        router: DestinationRouter,
        endpoints: Vec<EndpointConfig>,
        settings: SchedulerSettings,
    ) -> Self {
        Self { runner, store, router, endpoints, settings }
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Run one full cycle: probe every enabled endpoint, diff against the
    /// store, then alert on transitions.
    pub async fn run_cycle(&mut self) -> CycleReport {
        debug!("Starting monitoring cycle");

        let results = self.runner.run_cycle(&self.endpoints, self.settings.probe_timeout).await;

        for result in &results {
            if result.reachable {
                info!(
                    "{} ({}:{}) is UP - Response: {:.2}ms",
                    result.endpoint,
                    result.host,
                    result.port,
                    result.latency_ms()
                );
            } else {
                warn!(
                    "{} ({}:{}) is DOWN - Error: {}",
                    result.endpoint,
                    result.host,
                    result.port,
                    result.error_message.as_deref().unwrap_or("unknown")
                );
            }
        }

        let mut report = CycleReport {
            probed: results.len(),
            up: results.iter().filter(|r| r.reachable).count(),
            ..CycleReport::default()
        };
        report.down = report.probed - report.up;

        let events = self.store.diff_and_update(results);

        for event in events.iter().filter(|e| e.is_transition()) {
            report.transitions += 1;
            if event.went_down() {
                warn!("Endpoint {} went DOWN", event.endpoint());
            } else {
                info!("Endpoint {} came UP", event.endpoint());
            }
        }

        let outcomes = self.router.route_all(&events).await;
        report.delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
        report.failed_deliveries = outcomes.len() - report.delivered;

        debug!(?report, "Monitoring cycle completed");
        report
    }

    /// Run cycles until `shutdown` is cancelled.
    ///
    /// A cycle that panics is logged and counted as finished. Cancellation
    /// interrupts both the pauses and an in-flight cycle.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Monitoring started");
        info!("Check interval: {} seconds", self.settings.check_interval.as_secs());
        info!("Timeout: {} seconds", self.settings.probe_timeout.as_secs());
        info!(
            "Endpoints to monitor: {}",
            self.endpoints.iter().filter(|e| e.enabled).count()
        );

        let startup_delay = self.settings.startup_delay;
        let check_interval = self.settings.check_interval;

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Monitoring stopped");
                return;
            }
            _ = sleep(startup_delay) => {}
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Monitoring cancelled");
                    break;
                }
                outcome = AssertUnwindSafe(self.run_cycle()).catch_unwind() => {
                    if let Err(payload) = outcome {
                        error!("Error during monitoring cycle: {}", panic_message(payload.as_ref()));
                    }
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(check_interval) => {}
            }
        }

        info!("Monitoring stopped");
    }
}
