// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector runtime state, held exclusively by the supervisor's live
//! connector instances.
//!
//! This is deliberately a separate record from the persisted [`Channel`]
//! configuration: a reload destroys and recreates the runtime state so a
//! connector can never observe half-applied configuration.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{Channel, ChannelType, ConnectorStatus};

/// Shared runtime state for one live connector.
///
/// Cheap to clone behind an `Arc`; the polling task records poll times
/// while the supervisor reads snapshots for status reporting.
#[derive(Debug)]
pub struct RuntimeState {
    channel_id: Uuid,
    channel_type: ChannelType,
    config_keys: Vec<String>,
    running: AtomicBool,
    last_poll_at: RwLock<Option<DateTime<Utc>>>,
}

impl RuntimeState {
    /// Captures identity and configuration key names from a channel record.
    /// Secret values are not retained.
    pub fn for_channel(channel: &Channel) -> Self {
        let mut config_keys: Vec<String> = channel.config.keys().cloned().collect();
        config_keys.sort();
        Self {
            channel_id: channel.id,
            channel_type: channel.channel_type,
            config_keys,
            running: AtomicBool::new(false),
            last_poll_at: RwLock::new(None),
        }
    }

    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    pub fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Records a completed poll pass, success or partial failure alike.
    pub fn record_poll(&self) {
        *self.last_poll_at.write().expect("last_poll lock poisoned") = Some(Utc::now());
    }

    pub fn last_poll_at(&self) -> Option<DateTime<Utc>> {
        *self.last_poll_at.read().expect("last_poll lock poisoned")
    }

    /// Point-in-time snapshot for `status()` reporting.
    pub fn snapshot(&self) -> ConnectorStatus {
        ConnectorStatus {
            channel_id: self.channel_id,
            channel_type: self.channel_type,
            running: self.is_running(),
            last_poll_at: self.last_poll_at(),
            config_keys: self.config_keys.clone(),
        }
    }
}
