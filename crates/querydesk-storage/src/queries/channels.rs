// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel record operations.
//!
//! Channels are created and edited by the administrative layer; the engine
//! only reads them (and writes nothing back -- runtime state is not
//! persisted here).

use querydesk_core::{Channel, DeskError};
use rusqlite::params;
use uuid::Uuid;

use crate::codec;
use crate::database::{Database, map_tr_err};

/// Insert a channel record. Exposed for the administrative layer and tests.
pub async fn insert_channel(db: &Database, channel: &Channel) -> Result<(), DeskError> {
    let channel = channel.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO channels (id, name, channel_type, active, config, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    channel.id.to_string(),
                    channel.name,
                    channel.channel_type.to_string(),
                    channel.active,
                    codec::to_json(&channel.config)?,
                    codec::ts(&channel.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one channel by id.
pub async fn get_channel(db: &Database, id: Uuid) -> Result<Option<Channel>, DeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, channel_type, active, config, created_at
                 FROM channels WHERE id = ?1",
            )?;
            let mut rows = stmt.query_map(params![id.to_string()], channel_from_row)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List channels, optionally restricted to administratively active ones.
pub async fn list_channels(db: &Database, active_only: bool) -> Result<Vec<Channel>, DeskError> {
    db.connection()
        .call(move |conn| {
            let sql = if active_only {
                "SELECT id, name, channel_type, active, config, created_at
                 FROM channels WHERE active = 1 ORDER BY created_at ASC"
            } else {
                "SELECT id, name, channel_type, active, config, created_at
                 FROM channels ORDER BY created_at ASC"
            };
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map([], channel_from_row)?;
            let mut channels = Vec::new();
            for row in rows {
                channels.push(row?);
            }
            Ok(channels)
        })
        .await
        .map_err(map_tr_err)
}

fn channel_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Channel> {
    Ok(Channel {
        id: codec::parse_uuid(&row.get::<_, String>(0)?)?,
        name: row.get(1)?,
        channel_type: codec::parse_enum(&row.get::<_, String>(2)?)?,
        active: row.get(3)?,
        config: codec::from_json(&row.get::<_, String>(4)?)?,
        created_at: codec::parse_ts(&row.get::<_, String>(5)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use querydesk_core::ChannelType;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn mail_channel(active: bool) -> Channel {
        let mut config = HashMap::new();
        config.insert("host".into(), "imap.example.com".into());
        Channel {
            id: Uuid::new_v4(),
            name: "support-inbox".into(),
            channel_type: ChannelType::Mail,
            active,
            config,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("ch.db").to_str().unwrap())
            .await
            .unwrap();

        let channel = mail_channel(true);
        insert_channel(&db, &channel).await.unwrap();

        let fetched = get_channel(&db, channel.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "support-inbox");
        assert_eq!(fetched.channel_type, ChannelType::Mail);
        assert_eq!(fetched.config.get("host").unwrap(), "imap.example.com");
    }

    #[tokio::test]
    async fn get_unknown_channel_is_none() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("none.db").to_str().unwrap())
            .await
            .unwrap();
        assert!(get_channel(&db, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_active_only_filters_inactive() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("list.db").to_str().unwrap())
            .await
            .unwrap();

        insert_channel(&db, &mail_channel(true)).await.unwrap();
        insert_channel(&db, &mail_channel(false)).await.unwrap();

        assert_eq!(list_channels(&db, false).await.unwrap().len(), 2);
        let active = list_channels(&db, true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(active[0].active);
    }
}
