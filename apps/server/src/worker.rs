//! Portal background worker entry point.
//!
//! Starts the process worker that executes pending process steps: partner
//! data pushes, self-description issuance, connector registration, provider
//! callbacks and technical-user deletion.

use anyhow::Context;
use hanse::{
    config::Config,
    logging,
    workers::{ProcessWorker, WorkerState},
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.logging.deployment_environment,
        "Starting portal background worker"
    );

    if !config.workers.enabled {
        tracing::warn!("Workers are disabled in configuration");
        return Ok(());
    }

    tracing::info!(
        poll_interval_seconds = config.workers.poll_interval_seconds,
        batch_size = config.workers.batch_size,
        "Worker configuration loaded"
    );

    // Retry on DB connectivity errors so the worker survives transient
    // startup ordering issues.
    let state = init_worker_state_with_retry(config).await?;

    let worker = ProcessWorker::new(state);
    tracing::info!(worker_id = worker.worker_id(), "Worker registered");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    tracing::info!("Worker running. Press Ctrl+C to stop.");

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);
    match handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Worker task ended with error: {}", e),
        Err(e) => tracing::error!("Worker task join error: {}", e),
    }

    tracing::info!("Worker shutdown complete");
    Ok(())
}

async fn init_worker_state_with_retry(config: Config) -> anyhow::Result<WorkerState> {
    let mut retry_delay = Duration::from_secs(1);
    let max = Duration::from_secs(30);

    loop {
        match WorkerState::init(config.clone()).await {
            Ok(state) => return Ok(state),
            Err(hanse::Error::Database(e)) => {
                tracing::error!(
                    "Failed to initialize worker state (db unavailable): {} (retrying in {:?})",
                    e,
                    retry_delay
                );
                sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(max);
            }
            Err(e) => return Err(anyhow::anyhow!(e)).context("Failed to initialize worker state"),
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
/// Docker sends SIGTERM, while Ctrl+C sends SIGINT.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm =
        signal(SignalKind::terminate()).expect("Failed to install SIGTERM signal handler");
    let sigint = tokio::signal::ctrl_c();

    tokio::select! {
        _ = sigint => {
            tracing::info!("SIGINT received, stopping worker...");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, stopping worker...");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, stopping worker...");
}
