// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The long-running ingestion engine.

use std::sync::Arc;
use std::time::Duration;

use querydesk_classifier::ClassifierClient;
use querydesk_config::QuerydeskConfig;
use querydesk_core::DeskError;
use querydesk_lifecycle::QueryLifecycle;
use querydesk_storage::Storage;
use querydesk_supervisor::Supervisor;
use tracing::{info, warn};

use crate::factory::BuiltinFactory;

/// Bring the engine up, run until a shutdown signal, then wind down
/// within the configured grace period.
pub async fn run(config: QuerydeskConfig) -> Result<(), DeskError> {
    let storage = Storage::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "storage ready");

    let classifier = if config.classifier.disabled {
        info!("classification disabled, using heuristics only");
        None
    } else {
        Some(ClassifierClient::new(&config.classifier)?)
    };
    let lifecycle = QueryLifecycle::new(storage.clone(), classifier);

    let poll_interval = Duration::from_secs(config.ingest.poll_interval_secs);
    let shutdown_grace = Duration::from_secs(config.ingest.shutdown_grace_secs);
    let factory = Arc::new(BuiltinFactory::new(
        lifecycle.clone(),
        poll_interval,
        shutdown_grace,
    ));
    let supervisor = Supervisor::new(storage.clone(), factory, shutdown_grace);

    let started = supervisor.start_all_active().await?;
    if started == 0 {
        warn!("no channels started; engine is idle until channels are configured");
    }

    wait_for_shutdown().await;
    info!("shutdown signal received");

    supervisor.stop_all().await;
    storage.close().await?;
    info!("engine stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, relying on ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
