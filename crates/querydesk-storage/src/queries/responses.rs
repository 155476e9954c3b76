// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response record operations.

use querydesk_core::{DeskError, QueryResponse};
use rusqlite::params;
use uuid::Uuid;

use crate::codec;
use crate::database::{Database, map_tr_err};

/// Insert a response or internal note.
pub async fn insert_response(db: &Database, response: &QueryResponse) -> Result<(), DeskError> {
    let r = response.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO responses (id, query_id, user_id, content, is_internal, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    r.id.to_string(),
                    r.query_id.to_string(),
                    r.user_id.to_string(),
                    r.content,
                    r.is_internal,
                    codec::ts(&r.sent_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All responses for one query in send order.
pub async fn list_for_query(db: &Database, query_id: Uuid) -> Result<Vec<QueryResponse>, DeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, query_id, user_id, content, is_internal, sent_at
                 FROM responses WHERE query_id = ?1 ORDER BY sent_at ASC",
            )?;
            let rows = stmt.query_map(params![query_id.to_string()], |row| {
                Ok(QueryResponse {
                    id: codec::parse_uuid(&row.get::<_, String>(0)?)?,
                    query_id: codec::parse_uuid(&row.get::<_, String>(1)?)?,
                    user_id: codec::parse_uuid(&row.get::<_, String>(2)?)?,
                    content: row.get(3)?,
                    is_internal: row.get(4)?,
                    sent_at: codec::parse_ts(&row.get::<_, String>(5)?)?,
                })
            })?;
            let mut responses = Vec::new();
            for row in rows {
                responses.push(row?);
            }
            Ok(responses)
        })
        .await
        .map_err(map_tr_err)
}
