//! drivescan-worker: scans a Drive folder tree on a schedule and posts the
//! files it finds to an HTTP endpoint.
//!
//! Configuration comes from the environment (see `drivescan_core::Config`).

use anyhow::Context;
use clap::Parser;
use drivescan_core::Config;
use drivescan_infra::{init_telemetry, RunGuard, ScheduledTask, Scheduler, SchedulerConfig};
use drivescan_worker::ScanRunner;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "drivescan-worker", version, about = "Scheduled Drive folder scanner")]
struct Args {
    /// Perform a single run and exit
    #[arg(long)]
    once: bool,
    /// Seconds between runs; overrides SCAN_INTERVAL_SECS
    #[arg(long)]
    interval_secs: Option<u64>,
    /// Scan and log the result without posting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(secs) = args.interval_secs.filter(|s| *s > 0) {
        config.scan_interval_secs = secs;
    }

    init_telemetry(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.environment,
        config.log_format,
    )
    .map_err(|e| anyhow::anyhow!(e))
    .context("Failed to initialize logging")?;

    for fallback in &config.fallbacks {
        tracing::warn!(error = %fallback, "Ignoring invalid setting, using default");
    }
    tracing::info!(config = ?config, "Configuration loaded");

    let scheduler_config = SchedulerConfig {
        interval: config.scan_interval(),
        align_to_interval: config.scan_align_to_interval,
    };
    let runner = Arc::new(ScanRunner::new(config).dry_run(args.dry_run));

    if args.once {
        runner.run().await;
        return Ok(());
    }

    let scheduler = Scheduler::start(runner, scheduler_config, RunGuard::new());

    shutdown_signal().await;
    tracing::info!("Waiting for in-flight run to finish");
    scheduler.shutdown().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }
}
