// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query record operations.
//!
//! `insert_query` reports UNIQUE-index conflicts on (channel_id,
//! external_key) as a value instead of an error so the lifecycle manager
//! can resolve dedup races by re-reading the winning row.

use chrono::{DateTime, Utc};
use querydesk_core::{DeskError, Priority, Query, QueryStatus};
use rusqlite::params;
use uuid::Uuid;

use crate::codec;
use crate::database::{Database, is_unique_violation, map_tr_err};

const QUERY_COLUMNS: &str = "id, channel_id, category, subject, content, sender_name, \
     sender_address, sentiment, intent, confidence, auto_tags, priority, status, is_vip, \
     is_urgent, external_key, thread_key, attachments, metadata, received_at, assigned_at, \
     resolved_at, closed_at, sla_due_at";

/// Insert a new query. Returns `false` when the (channel, external key)
/// pair already exists, leaving the stored row untouched.
pub async fn insert_query(db: &Database, query: &Query) -> Result<bool, DeskError> {
    let q = query.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                &format!(
                    "INSERT INTO queries ({QUERY_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                             ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
                ),
                params![
                    q.id.to_string(),
                    q.channel_id.to_string(),
                    q.category,
                    q.subject,
                    q.content,
                    q.sender_name,
                    q.sender_address,
                    q.sentiment.to_string(),
                    q.intent,
                    q.confidence,
                    codec::to_json(&q.auto_tags)?,
                    q.priority.to_string(),
                    q.status.to_string(),
                    q.is_vip,
                    q.is_urgent,
                    q.external_key,
                    q.thread_key,
                    codec::to_json(&q.attachments)?,
                    codec::to_json(&q.metadata)?,
                    codec::ts(&q.received_at),
                    codec::opt_ts(&q.assigned_at),
                    codec::opt_ts(&q.resolved_at),
                    codec::opt_ts(&q.closed_at),
                    codec::ts(&q.sla_due_at),
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one query by id.
pub async fn get_query(db: &Database, id: Uuid) -> Result<Option<Query>, DeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUERY_COLUMNS} FROM queries WHERE id = ?1"
            ))?;
            let mut rows = stmt.query_map(params![id.to_string()], query_from_row)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Dedup lookup: the query owning `external_key` within `channel_id`.
pub async fn find_by_external_key(
    db: &Database,
    channel_id: Uuid,
    external_key: &str,
) -> Result<Option<Query>, DeskError> {
    let external_key = external_key.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUERY_COLUMNS} FROM queries
                 WHERE channel_id = ?1 AND external_key = ?2"
            ))?;
            let mut rows = stmt.query_map(
                params![channel_id.to_string(), external_key],
                query_from_row,
            )?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Targeted field update. Absent fields keep their stored values, so
/// concurrent patches of disjoint fields compose instead of the last
/// writer rolling the others back.
#[derive(Debug, Clone, Default)]
pub struct QueryPatch {
    pub category: Option<String>,
    pub is_vip: Option<bool>,
    /// New priority together with its recomputed SLA deadline.
    pub priority: Option<(Priority, DateTime<Utc>)>,
    pub status: Option<QueryStatus>,
}

impl QueryPatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.is_vip.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}

/// Apply a patch to one query, writing only the columns the patch names.
/// Entering ASSIGNED/RESOLVED/CLOSED stamps the matching timestamp in
/// the same statement, first entry only.
pub async fn patch_query(db: &Database, id: Uuid, patch: QueryPatch) -> Result<(), DeskError> {
    if patch.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    db.connection()
        .call(move |conn| {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<rusqlite::types::Value> = Vec::new();

            if let Some(category) = patch.category {
                sets.push("category = ?");
                values.push(category.into());
            }
            if let Some(is_vip) = patch.is_vip {
                sets.push("is_vip = ?");
                values.push(is_vip.into());
            }
            if let Some((priority, due)) = patch.priority {
                sets.push("priority = ?");
                values.push(priority.to_string().into());
                sets.push("sla_due_at = ?");
                values.push(codec::ts(&due).into());
            }
            if let Some(status) = patch.status {
                sets.push("status = ?");
                values.push(status.to_string().into());
                let stamp = match status {
                    QueryStatus::Assigned => Some("assigned_at = COALESCE(assigned_at, ?)"),
                    QueryStatus::Resolved => Some("resolved_at = COALESCE(resolved_at, ?)"),
                    QueryStatus::Closed => Some("closed_at = COALESCE(closed_at, ?)"),
                    _ => None,
                };
                if let Some(clause) = stamp {
                    sets.push(clause);
                    values.push(codec::ts(&now).into());
                }
            }
            values.push(id.to_string().into());

            let sql = format!("UPDATE queries SET {} WHERE id = ?", sets.join(", "));
            let changed = conn.execute(&sql, rusqlite::params_from_iter(values))?;
            if changed == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows.into());
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// NEW -> ASSIGNED with `assigned_at`, only while the row is still NEW.
/// The condition lives in the statement itself, so a concurrent status
/// change cannot be overwritten. Returns whether the transition happened.
pub async fn mark_assigned(
    db: &Database,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<bool, DeskError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE queries SET status = ?2, assigned_at = ?3
                 WHERE id = ?1 AND status = ?4",
                params![
                    id.to_string(),
                    QueryStatus::Assigned.to_string(),
                    codec::ts(&at),
                    QueryStatus::New.to_string(),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// NEW/ASSIGNED -> IN_PROGRESS on the first public response. Returns
/// whether the transition happened.
pub async fn mark_in_progress(db: &Database, id: Uuid) -> Result<bool, DeskError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE queries SET status = ?2
                 WHERE id = ?1 AND status IN (?3, ?4)",
                params![
                    id.to_string(),
                    QueryStatus::InProgress.to_string(),
                    QueryStatus::New.to_string(),
                    QueryStatus::Assigned.to_string(),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All queries belonging to one channel, oldest first.
pub async fn list_for_channel(db: &Database, channel_id: Uuid) -> Result<Vec<Query>, DeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUERY_COLUMNS} FROM queries
                 WHERE channel_id = ?1 ORDER BY received_at ASC"
            ))?;
            let rows = stmt.query_map(params![channel_id.to_string()], query_from_row)?;
            let mut queries = Vec::new();
            for row in rows {
                queries.push(row?);
            }
            Ok(queries)
        })
        .await
        .map_err(map_tr_err)
}

/// Total persisted query count (used by tests and the status command).
pub async fn count_all(db: &Database) -> Result<i64, DeskError> {
    db.connection()
        .call(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM queries", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

fn query_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Query> {
    Ok(Query {
        id: codec::parse_uuid(&row.get::<_, String>(0)?)?,
        channel_id: codec::parse_uuid(&row.get::<_, String>(1)?)?,
        category: row.get(2)?,
        subject: row.get(3)?,
        content: row.get(4)?,
        sender_name: row.get(5)?,
        sender_address: row.get(6)?,
        sentiment: codec::parse_enum(&row.get::<_, String>(7)?)?,
        intent: row.get(8)?,
        confidence: row.get(9)?,
        auto_tags: codec::from_json(&row.get::<_, String>(10)?)?,
        priority: codec::parse_enum(&row.get::<_, String>(11)?)?,
        status: codec::parse_enum(&row.get::<_, String>(12)?)?,
        is_vip: row.get(13)?,
        is_urgent: row.get(14)?,
        external_key: row.get(15)?,
        thread_key: row.get(16)?,
        attachments: codec::from_json(&row.get::<_, String>(17)?)?,
        metadata: codec::from_json(&row.get::<_, String>(18)?)?,
        received_at: codec::parse_ts(&row.get::<_, String>(19)?)?,
        assigned_at: codec::parse_opt_ts(row.get(20)?)?,
        resolved_at: codec::parse_opt_ts(row.get(21)?)?,
        closed_at: codec::parse_opt_ts(row.get(22)?)?,
        sla_due_at: codec::parse_ts(&row.get::<_, String>(23)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::channels::insert_channel;
    use chrono::{Duration, Utc};
    use querydesk_core::{Channel, ChannelType, Priority, QueryStatus, Sentiment};
    use std::collections::HashMap;
    use tempfile::tempdir;

    async fn setup() -> (Database, Uuid, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("q.db").to_str().unwrap())
            .await
            .unwrap();
        let channel = Channel {
            id: Uuid::new_v4(),
            name: "inbox".into(),
            channel_type: ChannelType::Mail,
            active: true,
            config: HashMap::new(),
            created_at: Utc::now(),
        };
        insert_channel(&db, &channel).await.unwrap();
        (db, channel.id, dir)
    }

    fn make_query(channel_id: Uuid, external_key: &str) -> Query {
        let now = Utc::now();
        Query {
            id: Uuid::new_v4(),
            channel_id,
            category: Some("question".into()),
            subject: Some("Help".into()),
            content: "How do I reset my password?".into(),
            sender_name: Some("Sam Doe".into()),
            sender_address: "sam@example.com".into(),
            sentiment: Sentiment::Neutral,
            intent: None,
            confidence: 0.5,
            auto_tags: vec!["account".into()],
            priority: Priority::Medium,
            status: QueryStatus::New,
            is_vip: false,
            is_urgent: false,
            external_key: external_key.into(),
            thread_key: None,
            attachments: Vec::new(),
            metadata: HashMap::new(),
            received_at: now,
            assigned_at: None,
            resolved_at: None,
            closed_at: None,
            sla_due_at: now + Duration::hours(24),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let (db, channel_id, _dir) = setup().await;
        let query = make_query(channel_id, "msg-1");

        assert!(insert_query(&db, &query).await.unwrap());
        let fetched = get_query(&db, query.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, query.content);
        assert_eq!(fetched.priority, Priority::Medium);
        assert_eq!(fetched.status, QueryStatus::New);
        assert_eq!(fetched.auto_tags, vec!["account".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_external_key_reports_conflict_not_error() {
        let (db, channel_id, _dir) = setup().await;
        let first = make_query(channel_id, "msg-dup");
        let second = make_query(channel_id, "msg-dup");

        assert!(insert_query(&db, &first).await.unwrap());
        assert!(!insert_query(&db, &second).await.unwrap());
        assert_eq!(count_all(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn same_key_on_different_channels_is_allowed() {
        let (db, channel_a, _dir) = setup().await;
        let channel_b = Channel {
            id: Uuid::new_v4(),
            name: "second".into(),
            channel_type: ChannelType::Chat,
            active: true,
            config: HashMap::new(),
            created_at: Utc::now(),
        };
        insert_channel(&db, &channel_b).await.unwrap();

        assert!(insert_query(&db, &make_query(channel_a, "k")).await.unwrap());
        assert!(
            insert_query(&db, &make_query(channel_b.id, "k"))
                .await
                .unwrap()
        );
        assert_eq!(count_all(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn find_by_external_key_hits_and_misses() {
        let (db, channel_id, _dir) = setup().await;
        let query = make_query(channel_id, "msg-find");
        insert_query(&db, &query).await.unwrap();

        let found = find_by_external_key(&db, channel_id, "msg-find")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, query.id);

        assert!(
            find_by_external_key(&db, channel_id, "msg-other")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn patch_touches_only_named_columns() {
        let (db, channel_id, _dir) = setup().await;
        let query = make_query(channel_id, "msg-patch");
        insert_query(&db, &query).await.unwrap();

        let due = Utc::now() + Duration::hours(1);
        patch_query(
            &db,
            query.id,
            QueryPatch {
                priority: Some((Priority::Critical, due)),
                ..QueryPatch::default()
            },
        )
        .await
        .unwrap();
        patch_query(
            &db,
            query.id,
            QueryPatch {
                status: Some(QueryStatus::InProgress),
                ..QueryPatch::default()
            },
        )
        .await
        .unwrap();

        // The status patch must not have rolled back the priority patch.
        let fetched = get_query(&db, query.id).await.unwrap().unwrap();
        assert_eq!(fetched.priority, Priority::Critical);
        assert_eq!(fetched.status, QueryStatus::InProgress);
        assert_eq!(fetched.sla_due_at.timestamp_millis(), due.timestamp_millis());
        assert_eq!(fetched.category, query.category);
    }

    #[tokio::test]
    async fn patch_unknown_query_errors() {
        let (db, _channel_id, _dir) = setup().await;
        let patch = QueryPatch {
            is_vip: Some(true),
            ..QueryPatch::default()
        };
        assert!(patch_query(&db, Uuid::new_v4(), patch).await.is_err());
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op() {
        let (db, _channel_id, _dir) = setup().await;
        patch_query(&db, Uuid::new_v4(), QueryPatch::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn assignment_transition_only_fires_from_new() {
        let (db, channel_id, _dir) = setup().await;
        let query = make_query(channel_id, "msg-assign");
        insert_query(&db, &query).await.unwrap();

        assert!(mark_assigned(&db, query.id, Utc::now()).await.unwrap());
        assert!(mark_in_progress(&db, query.id).await.unwrap());
        assert!(!mark_assigned(&db, query.id, Utc::now()).await.unwrap());

        let fetched = get_query(&db, query.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, QueryStatus::InProgress);
        assert!(fetched.assigned_at.is_some());
    }

    #[tokio::test]
    async fn in_progress_transition_skips_resolved_queries() {
        let (db, channel_id, _dir) = setup().await;
        let query = make_query(channel_id, "msg-resolved");
        insert_query(&db, &query).await.unwrap();

        patch_query(
            &db,
            query.id,
            QueryPatch {
                status: Some(QueryStatus::Resolved),
                ..QueryPatch::default()
            },
        )
        .await
        .unwrap();

        assert!(!mark_in_progress(&db, query.id).await.unwrap());
        let fetched = get_query(&db, query.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, QueryStatus::Resolved);
        assert!(fetched.resolved_at.is_some());
    }

    #[tokio::test]
    async fn resolved_stamp_is_write_once() {
        let (db, channel_id, _dir) = setup().await;
        let query = make_query(channel_id, "msg-stamp");
        insert_query(&db, &query).await.unwrap();

        let resolve = QueryPatch {
            status: Some(QueryStatus::Resolved),
            ..QueryPatch::default()
        };
        patch_query(&db, query.id, resolve.clone()).await.unwrap();
        let first = get_query(&db, query.id).await.unwrap().unwrap();

        patch_query(
            &db,
            query.id,
            QueryPatch {
                status: Some(QueryStatus::Closed),
                ..QueryPatch::default()
            },
        )
        .await
        .unwrap();
        patch_query(&db, query.id, resolve).await.unwrap();

        let second = get_query(&db, query.id).await.unwrap().unwrap();
        assert_eq!(second.resolved_at, first.resolved_at);
        assert!(second.closed_at.is_some());
    }
}
