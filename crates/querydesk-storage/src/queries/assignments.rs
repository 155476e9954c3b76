// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment record operations.

use querydesk_core::{Assignment, DeskError};
use rusqlite::params;
use uuid::Uuid;

use crate::codec;
use crate::database::{Database, is_unique_violation, map_tr_err};

/// Insert an assignment. Returns `false` when the (query, user) pair is
/// already assigned -- the UNIQUE constraint makes this race-safe under
/// concurrent agents.
pub async fn insert_assignment(db: &Database, assignment: &Assignment) -> Result<bool, DeskError> {
    let a = assignment.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO assignments (id, query_id, user_id, assigned_by, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    a.id.to_string(),
                    a.query_id.to_string(),
                    a.user_id.to_string(),
                    a.assigned_by.to_string(),
                    a.notes,
                    codec::ts(&a.created_at),
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

/// All assignments for one query, oldest first.
pub async fn list_for_query(db: &Database, query_id: Uuid) -> Result<Vec<Assignment>, DeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, query_id, user_id, assigned_by, notes, created_at
                 FROM assignments WHERE query_id = ?1 ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map(params![query_id.to_string()], |row| {
                Ok(Assignment {
                    id: codec::parse_uuid(&row.get::<_, String>(0)?)?,
                    query_id: codec::parse_uuid(&row.get::<_, String>(1)?)?,
                    user_id: codec::parse_uuid(&row.get::<_, String>(2)?)?,
                    assigned_by: codec::parse_uuid(&row.get::<_, String>(3)?)?,
                    notes: row.get(4)?,
                    created_at: codec::parse_ts(&row.get::<_, String>(5)?)?,
                })
            })?;
            let mut assignments = Vec::new();
            for row in rows {
                assignments.push(row?);
            }
            Ok(assignments)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn make_assignment(query_id: Uuid, user_id: Uuid) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            query_id,
            user_id,
            assigned_by: Uuid::new_v4(),
            notes: Some("take this one".into()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_pair_reports_conflict() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("a.db").to_str().unwrap())
            .await
            .unwrap();

        // Foreign keys are enforced, so park a real query row first.
        let (query_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());
        seed_query(&db, query_id).await;

        assert!(
            insert_assignment(&db, &make_assignment(query_id, user_id))
                .await
                .unwrap()
        );
        assert!(
            !insert_assignment(&db, &make_assignment(query_id, user_id))
                .await
                .unwrap()
        );
        assert_eq!(list_for_query(&db, query_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn different_users_may_share_a_query() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("b.db").to_str().unwrap())
            .await
            .unwrap();
        let query_id = Uuid::new_v4();
        seed_query(&db, query_id).await;

        assert!(
            insert_assignment(&db, &make_assignment(query_id, Uuid::new_v4()))
                .await
                .unwrap()
        );
        assert!(
            insert_assignment(&db, &make_assignment(query_id, Uuid::new_v4()))
                .await
                .unwrap()
        );
        assert_eq!(list_for_query(&db, query_id).await.unwrap().len(), 2);
    }

    async fn seed_query(db: &Database, query_id: Uuid) {
        let channel_id = Uuid::new_v4();
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO channels (id, name, channel_type, active, config, created_at)
                     VALUES (?1, 'c', 'MAIL', 1, '{}', '2026-01-01T00:00:00.000Z')",
                    params![channel_id.to_string()],
                )?;
                conn.execute(
                    "INSERT INTO queries (id, channel_id, content, sender_address, sentiment,
                         confidence, auto_tags, priority, status, is_vip, is_urgent,
                         external_key, attachments, metadata, received_at, sla_due_at)
                     VALUES (?1, ?2, 'hi', 'x@example.com', 'NEUTRAL', 0, '[]', 'MEDIUM',
                         'NEW', 0, 0, ?1, '[]', '{}', '2026-01-01T00:00:00.000Z',
                         '2026-01-02T00:00:00.000Z')",
                    params![query_id.to_string(), channel_id.to_string()],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();
    }
}
