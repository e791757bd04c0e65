use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use tracing::{error, info, warn};

use super::checker::Prober;
use super::types::{EndpointConfig, ProbeResult};
use crate::fault::panic_message;

/// Probes every enabled endpoint of a cycle concurrently
#[derive(Clone)]
pub struct CycleRunner {
    prober: Arc<dyn Prober>,
}

impl CycleRunner {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }

    /// Probe all enabled endpoints and wait for every probe to finish.
    ///
    /// Results come back in endpoint order. A probe that panics is reported as
    /// an unreachable result for its endpoint; its siblings are unaffected.
    pub async fn run_cycle(&self, endpoints: &[EndpointConfig], timeout: Duration) -> Vec<ProbeResult> {
        let enabled: Vec<&EndpointConfig> = endpoints.iter().filter(|e| e.enabled).collect();

        if enabled.is_empty() {
            warn!("No enabled endpoints found to monitor");
            return Vec::new();
        }

        info!("Checking {} endpoints", enabled.len());

        let probes = enabled.into_iter().map(|endpoint| async move {
            match AssertUnwindSafe(self.prober.probe(endpoint, timeout)).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(
                        "Error checking {} at {}:{}: {}",
                        endpoint.name, endpoint.host, endpoint.port, reason
                    );
                    ProbeResult::new(endpoint)
                        .failure(format!("Probe failed unexpectedly: {reason}"), Duration::ZERO)
                }
            }
        });

        let results = join_all(probes).await;

        let up_count = results.iter().filter(|r| r.reachable).count();
        let down_count = results.len() - up_count;
        info!("Endpoint check completed: {} up, {} down", up_count, down_count);

        results
    }
}

impl std::fmt::Debug for CycleRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleRunner").finish_non_exhaustive()
    }
}
