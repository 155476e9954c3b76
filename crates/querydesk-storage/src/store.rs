// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed storage facade over the [`Database`] handle.
//!
//! Wraps the per-entity query modules behind one object the lifecycle
//! manager and supervisor share. Cloning is cheap; all clones write
//! through the same single-writer connection.

use chrono::{DateTime, Utc};
use querydesk_core::{Assignment, Channel, DeskError, Query, QueryResponse};
use uuid::Uuid;

use crate::database::Database;
use crate::queries;
use crate::queries::queries::QueryPatch;

/// SQLite-backed storage for channels, queries, assignments, and responses.
#[derive(Clone)]
pub struct Storage {
    db: Database,
}

impl Storage {
    /// Open (or create) the database at `path` and run migrations.
    pub async fn open(path: &str) -> Result<Self, DeskError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Returns a reference to the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and release before shutdown.
    pub async fn close(&self) -> Result<(), DeskError> {
        self.db.close().await
    }

    // --- Channels (read-mostly; writes belong to the admin layer) ---

    pub async fn insert_channel(&self, channel: &Channel) -> Result<(), DeskError> {
        queries::channels::insert_channel(&self.db, channel).await
    }

    pub async fn get_channel(&self, id: Uuid) -> Result<Option<Channel>, DeskError> {
        queries::channels::get_channel(&self.db, id).await
    }

    pub async fn list_channels(&self, active_only: bool) -> Result<Vec<Channel>, DeskError> {
        queries::channels::list_channels(&self.db, active_only).await
    }

    // --- Queries ---

    /// Returns `false` on a (channel, external key) conflict.
    pub async fn insert_query(&self, query: &Query) -> Result<bool, DeskError> {
        queries::queries::insert_query(&self.db, query).await
    }

    pub async fn get_query(&self, id: Uuid) -> Result<Option<Query>, DeskError> {
        queries::queries::get_query(&self.db, id).await
    }

    pub async fn find_query_by_external_key(
        &self,
        channel_id: Uuid,
        external_key: &str,
    ) -> Result<Option<Query>, DeskError> {
        queries::queries::find_by_external_key(&self.db, channel_id, external_key).await
    }

    /// Patch specific fields; columns the patch does not name keep their
    /// stored values even under concurrent writers.
    pub async fn patch_query(&self, id: Uuid, patch: QueryPatch) -> Result<(), DeskError> {
        queries::queries::patch_query(&self.db, id, patch).await
    }

    /// NEW -> ASSIGNED if the query is still NEW; returns whether the
    /// transition happened.
    pub async fn mark_query_assigned(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, DeskError> {
        queries::queries::mark_assigned(&self.db, id, at).await
    }

    /// NEW/ASSIGNED -> IN_PROGRESS; returns whether the transition
    /// happened.
    pub async fn mark_query_in_progress(&self, id: Uuid) -> Result<bool, DeskError> {
        queries::queries::mark_in_progress(&self.db, id).await
    }

    pub async fn list_queries_for_channel(&self, channel_id: Uuid) -> Result<Vec<Query>, DeskError> {
        queries::queries::list_for_channel(&self.db, channel_id).await
    }

    pub async fn count_queries(&self) -> Result<i64, DeskError> {
        queries::queries::count_all(&self.db).await
    }

    // --- Assignments ---

    /// Returns `false` on a (query, user) conflict.
    pub async fn insert_assignment(&self, assignment: &Assignment) -> Result<bool, DeskError> {
        queries::assignments::insert_assignment(&self.db, assignment).await
    }

    pub async fn assignments_for_query(&self, query_id: Uuid) -> Result<Vec<Assignment>, DeskError> {
        queries::assignments::list_for_query(&self.db, query_id).await
    }

    // --- Responses ---

    pub async fn insert_response(&self, response: &QueryResponse) -> Result<(), DeskError> {
        queries::responses::insert_response(&self.db, response).await
    }

    pub async fn responses_for_query(
        &self,
        query_id: Uuid,
    ) -> Result<Vec<QueryResponse>, DeskError> {
        queries::responses::list_for_query(&self.db, query_id).await
    }
}
