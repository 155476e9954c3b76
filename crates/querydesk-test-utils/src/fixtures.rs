// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage and domain fixtures.

use std::collections::HashMap;

use chrono::Utc;
use querydesk_core::{Channel, ChannelType, InboundEvent};
use querydesk_storage::Storage;
use tempfile::TempDir;
use uuid::Uuid;

/// Opens a storage instance backed by a fresh temporary directory. The
/// directory is removed when the returned guard drops.
pub async fn temp_storage() -> (Storage, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("querydesk-test.db");
    let storage = Storage::open(path.to_str().expect("utf-8 temp path"))
        .await
        .expect("open test storage");
    (storage, dir)
}

/// Inserts and returns an active channel of the given type.
pub async fn seed_channel(
    storage: &Storage,
    channel_type: ChannelType,
    config: &[(&str, &str)],
) -> Channel {
    let channel = Channel {
        id: Uuid::new_v4(),
        name: format!("test-{}", channel_type.to_string().to_lowercase()),
        channel_type,
        active: true,
        config: config
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        created_at: Utc::now(),
    };
    storage
        .insert_channel(&channel)
        .await
        .expect("insert test channel");
    channel
}

/// A plain inbound event with a caller-chosen dedup key.
pub fn sample_event(external_key: &str) -> InboundEvent {
    InboundEvent {
        content: "I need help with my account".into(),
        subject: Some("Account help".into()),
        sender_name: Some("Test Sender".into()),
        sender_address: "sender@example.com".into(),
        external_key: external_key.into(),
        thread_key: None,
        attachments: Vec::new(),
        metadata: HashMap::new(),
    }
}
