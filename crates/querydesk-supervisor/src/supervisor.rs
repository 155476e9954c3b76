// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The connector registry.
//!
//! Holds at most one live connector per channel and serializes lifecycle
//! operations through a single async mutex, so concurrent start/stop
//! calls for the same channel cannot interleave. Connector construction
//! goes through an injected [`ConnectorFactory`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use querydesk_core::{
    Channel, ConnectionTest, Connector, ConnectorFactory, ConnectorStatus, DeskError,
};
use querydesk_storage::Storage;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Owns and drives every live channel connector.
pub struct Supervisor {
    storage: Storage,
    factory: Arc<dyn ConnectorFactory>,
    connectors: Mutex<HashMap<Uuid, Box<dyn Connector>>>,
    shutdown_grace: Duration,
}

impl Supervisor {
    pub fn new(
        storage: Storage,
        factory: Arc<dyn ConnectorFactory>,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            storage,
            factory,
            connectors: Mutex::new(HashMap::new()),
            shutdown_grace,
        }
    }

    /// Start the connector for a channel. No-op when one is already
    /// registered. The connector is registered only after `initialize`
    /// and `start` both succeed, so a failed start leaves no trace.
    pub async fn start_channel(&self, channel_id: Uuid) -> Result<(), DeskError> {
        let mut connectors = self.connectors.lock().await;
        if connectors.contains_key(&channel_id) {
            warn!(%channel_id, "connector already running, ignoring start");
            return Ok(());
        }

        let channel = self.load_channel(channel_id).await?;
        if !channel.active {
            return Err(DeskError::UnsupportedChannel(format!(
                "channel {} is inactive",
                channel.name
            )));
        }

        let mut connector = self.factory.build(&channel)?;
        connector.initialize().await?;
        connector.start().await?;
        info!(%channel_id, channel_type = %channel.channel_type, "connector started");
        connectors.insert(channel_id, connector);
        Ok(())
    }

    /// Stop and deregister a channel's connector. The connector is
    /// removed even when its stop fails; a connector that cannot stop
    /// cleanly must not stay registered as live.
    pub async fn stop_channel(&self, channel_id: Uuid) -> Result<(), DeskError> {
        let mut connectors = self.connectors.lock().await;
        let Some(mut connector) = connectors.remove(&channel_id) else {
            warn!(%channel_id, "no running connector, ignoring stop");
            return Ok(());
        };
        if let Err(e) = connector.stop().await {
            error!(%channel_id, error = %e, "connector stop failed, deregistered anyway");
        } else {
            info!(%channel_id, "connector stopped");
        }
        Ok(())
    }

    /// Stop, rebuild from the current channel record, and restart. On
    /// failure the channel ends up stopped, never half-configured.
    pub async fn reload_channel(&self, channel_id: Uuid) -> Result<(), DeskError> {
        self.stop_channel(channel_id).await?;
        self.start_channel(channel_id).await
    }

    /// Probe a channel's credentials with a throwaway connector instance.
    /// Works whether or not the channel is running and never touches the
    /// registry.
    pub async fn test_channel_connection(
        &self,
        channel_id: Uuid,
    ) -> Result<ConnectionTest, DeskError> {
        let channel = self.load_channel(channel_id).await?;
        let mut connector = self.factory.build(&channel)?;
        if let Err(e) = connector.initialize().await {
            return Ok(ConnectionTest::failed(format!("initialization failed: {e}")));
        }
        Ok(connector.test_connection().await)
    }

    /// Snapshot of every live connector's state, sorted by channel id for
    /// stable output.
    pub async fn status(&self) -> Vec<ConnectorStatus> {
        let connectors = self.connectors.lock().await;
        let mut statuses: Vec<ConnectorStatus> =
            connectors.values().map(|c| c.status()).collect();
        statuses.sort_by_key(|s| s.channel_id);
        statuses
    }

    /// Forward a reply through the live connector for `channel_id`.
    pub async fn send_reply(
        &self,
        channel_id: Uuid,
        query_id: Uuid,
        user_id: Uuid,
        content: &str,
        attachments: &[querydesk_core::Attachment],
    ) -> Result<querydesk_core::QueryResponse, DeskError> {
        let connectors = self.connectors.lock().await;
        let connector = connectors.get(&channel_id).ok_or_else(|| DeskError::NotFound {
            kind: "connector",
            id: channel_id.to_string(),
        })?;
        connector
            .send_reply(query_id, user_id, content, attachments)
            .await
    }

    /// Start every active channel. One channel failing (bad config,
    /// unsupported type, unreachable provider) never prevents the rest
    /// from starting; failures are logged and counted.
    pub async fn start_all_active(&self) -> Result<usize, DeskError> {
        let channels = self.storage.list_channels(true).await?;
        let mut started = 0;
        for channel in channels {
            match self.start_channel(channel.id).await {
                Ok(()) => started += 1,
                Err(e) => {
                    error!(
                        channel_id = %channel.id,
                        channel = %channel.name,
                        error = %e,
                        "failed to start channel"
                    );
                }
            }
        }
        info!(started, "startup complete");
        Ok(started)
    }

    /// Stop every running connector, bounded by the shutdown grace
    /// period. Connectors still busy when it elapses are abandoned with a
    /// warning rather than blocking shutdown.
    pub async fn stop_all(&self) {
        let drained: Vec<(Uuid, Box<dyn Connector>)> = {
            let mut connectors = self.connectors.lock().await;
            connectors.drain().collect()
        };
        if drained.is_empty() {
            return;
        }

        let stop_everything = async {
            for (channel_id, mut connector) in drained {
                if let Err(e) = connector.stop().await {
                    error!(%channel_id, error = %e, "connector stop failed during shutdown");
                }
            }
        };
        if tokio::time::timeout(self.shutdown_grace, stop_everything)
            .await
            .is_err()
        {
            warn!(
                grace_secs = self.shutdown_grace.as_secs(),
                "shutdown grace elapsed, abandoning remaining connectors"
            );
        } else {
            info!("all connectors stopped");
        }
    }

    async fn load_channel(&self, channel_id: Uuid) -> Result<Channel, DeskError> {
        self.storage
            .get_channel(channel_id)
            .await?
            .ok_or_else(|| DeskError::NotFound {
                kind: "channel",
                id: channel_id.to_string(),
            })
    }
}
