use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::types::{EndpointConfig, ProbeResult};

/// Why a probe could not establish a connection
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Connection timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Connect(#[from] io::Error),
}

/// Reachability check for a single endpoint
///
/// Implementations never fail: every outcome, including unexpected faults,
/// is folded into the returned [`ProbeResult`].
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &EndpointConfig, timeout: Duration) -> ProbeResult;
}

/// Probes endpoints by opening (and immediately dropping) a TCP connection
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

/// Race `connect` against a timer of `limit`.
pub async fn connect_within<F, T>(connect: F, limit: Duration) -> Result<T, ProbeError>
where
    F: Future<Output = io::Result<T>>,
{
    timeout(limit, connect).await.map_err(|_| ProbeError::Timeout(limit))?.map_err(ProbeError::from)
}

/// Build a result for `endpoint` from a connection attempt bounded by `limit`.
async fn probe_with<F, T>(endpoint: &EndpointConfig, limit: Duration, connect: F) -> ProbeResult
where
    F: Future<Output = io::Result<T>>,
{
    let result = ProbeResult::new(endpoint);
    let start = Instant::now();

    let outcome = connect_within(connect, limit).await;
    let latency = start.elapsed();

    let result = match outcome {
        Ok(_stream) => result.success(latency),
        Err(e) => result.failure(e.to_string(), latency),
    };

    debug!(
        "{} check completed: {} in {:.2}ms",
        endpoint.name,
        result.status(),
        result.latency_ms()
    );

    result
}

#[async_trait::async_trait]
impl Prober for TcpProber {
    async fn probe(&self, endpoint: &EndpointConfig, limit: Duration) -> ProbeResult {
        debug!("Checking {} at {}:{}", endpoint.name, endpoint.host, endpoint.port);

        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        probe_with(endpoint, limit, connect).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_reachable_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let endpoint = EndpointConfig::new("local", "127.0.0.1", port);
        let result = TcpProber::new().probe(&endpoint, Duration::from_secs(1)).await;

        assert!(result.reachable);
        assert!(result.error_message.is_none());
        assert_eq!(result.endpoint, "local");
        assert_eq!(result.port, port);
    }

    #[tokio::test]
    async fn test_refused_port() {
        // Bind then release to get a port that is very likely closed
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let endpoint = EndpointConfig::new("closed", "127.0.0.1", port);
        let result = TcpProber::new().probe(&endpoint, Duration::from_secs(1)).await;

        assert!(!result.reachable);
        let error = result.error_message.expect("unreachable result carries an error");
        assert!(!error.is_empty());
        assert!(!error.starts_with("Connection timeout"));
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let endpoint = EndpointConfig::new("nowhere", "does-not-exist.invalid", 80);
        let result = TcpProber::new().probe(&endpoint, Duration::from_secs(5)).await;

        assert!(!result.reachable);
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn test_connect_timeout_message() {
        let limit = Duration::from_millis(200);
        let start = Instant::now();

        let outcome = connect_within(std::future::pending::<io::Result<()>>(), limit).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= limit);
        assert!(elapsed < Duration::from_secs(2), "timeout took {elapsed:?}");

        let error = outcome.unwrap_err();
        assert!(matches!(error, ProbeError::Timeout(_)));
        assert_eq!(error.to_string(), "Connection timeout after 200ms");
    }

    #[tokio::test]
    async fn test_unanswered_connect_times_out_after_limit() {
        let endpoint = EndpointConfig::new("blackhole", "10.255.255.1", 81);
        let limit = Duration::from_secs(1);
        let start = Instant::now();

        let result = probe_with(&endpoint, limit, std::future::pending::<io::Result<TcpStream>>()).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= limit);
        assert!(elapsed < Duration::from_millis(2500), "timeout took {elapsed:?}");
        assert!(!result.reachable);
        assert_eq!(result.error_message.as_deref(), Some("Connection timeout after 1000ms"));
        assert_eq!(result.endpoint, "blackhole");
        assert!(result.latency >= limit);
    }

    #[tokio::test]
    async fn test_connect_error_is_passed_through() {
        let failing = async { Err::<(), _>(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")) };
        let error = connect_within(failing, Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(error.to_string(), "refused");
    }
}
