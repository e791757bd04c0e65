use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use portwatch::{
    CancellationToken, CycleRunner, CycleScheduler, DestinationRouter, StatusStore, TcpProber,
};
use tracing::{debug, info, warn};

mod config;
mod validation;

use config::Config;

/// Timeout for a single alert delivery
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP uptime monitor with per-destination alerting
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the config file (defaults to $XDG_CONFIG_HOME/portwatch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_tracing();
    let cli = Cli::parse();

    let config = Config::from_config(cli.config.as_deref()).context("failed to load configuration")?;
    config.validate()?;
    for warning in config.warnings() {
        warn!("{warning}");
    }

    if cli.check {
        println!("{config}");
        return Ok(());
    }
    debug!("{config}");

    info!("Starting portwatch...");

    let client = reqwest::Client::builder()
        .timeout(NOTIFICATION_TIMEOUT)
        .user_agent(concat!("portwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let router = DestinationRouter::gotify(&client, config.destinations());
    let destination_names: Vec<&str> = router.destinations().iter().map(|d| d.name()).collect();
    info!("Alert destinations: {}", destination_names.join(", "));

    let scheduler = CycleScheduler::new(
        CycleRunner::new(Arc::new(TcpProber::new())),
        StatusStore::new(),
        router,
        config.endpoints.clone(),
        config.scheduler_settings(),
    );

    let shutdown = CancellationToken::new();
    let monitor = tokio::spawn(scheduler.run(shutdown.clone()));

    shutdown_signal().await;
    info!("Shutdown signal received");
    shutdown.cancel();

    monitor.await.context("monitoring task failed")?;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
