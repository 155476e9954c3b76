// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The query lifecycle manager.
//!
//! Owns creation (dedup, classification, triage), assignment, responses,
//! and status transitions. Connectors and the administrative layer go
//! through this type; nothing else writes queries.
//!
//! Every mutation writes only the columns it owns, with status
//! transitions made conditional inside the statement itself, so
//! concurrent operations on the same query never roll back each other's
//! fields.

use chrono::Utc;
use querydesk_classifier::{AnalyzeRequest, Classification, ClassifierClient};
use querydesk_core::{
    Assignment, ChannelType, DeskError, NewQuery, Priority, Query, QueryResponse, QueryStatus,
};
use querydesk_storage::{QueryPatch, Storage};
use querydesk_triage::{is_urgent, resolve_priority, sla_due};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Partial update applied to an existing query.
///
/// Absent fields are left untouched. A priority change recomputes the SLA
/// deadline from the moment of the change.
#[derive(Debug, Clone, Default)]
pub struct QueryUpdate {
    pub priority: Option<Priority>,
    pub status: Option<QueryStatus>,
    pub category: Option<String>,
    pub is_vip: Option<bool>,
}

/// Coordinates query state against storage, with optional classification.
#[derive(Clone)]
pub struct QueryLifecycle {
    storage: Storage,
    classifier: Option<ClassifierClient>,
}

impl QueryLifecycle {
    /// `classifier` is `None` when classification is disabled; creation
    /// then runs on heuristics alone.
    pub fn new(storage: Storage, classifier: Option<ClassifierClient>) -> Self {
        Self {
            storage,
            classifier,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Create a query from a normalized event, or return the existing one
    /// when the (channel, external key) pair was already ingested.
    ///
    /// Creation never fails because of the classifier; a degraded
    /// classification falls through to the heuristic triage rules.
    pub async fn create_query(&self, new: NewQuery) -> Result<Query, DeskError> {
        let channel = self
            .storage
            .get_channel(new.channel_id)
            .await?
            .ok_or_else(|| DeskError::NotFound {
                kind: "channel",
                id: new.channel_id.to_string(),
            })?;

        if let Some(existing) = self
            .storage
            .find_query_by_external_key(new.channel_id, &new.event.external_key)
            .await?
        {
            debug!(
                query_id = %existing.id,
                external_key = %new.event.external_key,
                "duplicate event, returning existing query"
            );
            return Ok(existing);
        }

        let classification = if new.skip_classification {
            None
        } else {
            match &self.classifier {
                Some(client) => {
                    Some(client.analyze(&analyze_request(&new, channel.channel_type)).await)
                }
                None => None,
            }
        };

        let query = self.build_query(&new, classification);
        if self.storage.insert_query(&query).await? {
            info!(
                query_id = %query.id,
                channel_id = %query.channel_id,
                priority = %query.priority,
                "query created"
            );
            return Ok(query);
        }

        // Lost a race with a concurrent insert of the same event; the
        // unique index decided, so read back the winner.
        self.storage
            .find_query_by_external_key(new.channel_id, &new.event.external_key)
            .await?
            .ok_or_else(|| {
                DeskError::Internal(format!(
                    "query for external key {} vanished after conflict",
                    new.event.external_key
                ))
            })
    }

    fn build_query(&self, new: &NewQuery, classification: Option<Classification>) -> Query {
        let now = Utc::now();
        let event = &new.event;

        // Degraded output is a placeholder; its MEDIUM/NEUTRAL values
        // must not outrank the heuristics below.
        let trusted = classification.as_ref().filter(|c| !c.degraded);

        let sentiment = trusted.map(|c| c.sentiment).unwrap_or_default();
        let is_vip = new
            .is_vip
            .or(trusted.map(|c| c.is_vip))
            .unwrap_or(false);
        let decision = resolve_priority(
            new.priority,
            is_vip,
            sentiment,
            &event.content,
            trusted.map(|c| c.priority),
        );
        debug!(reason = decision.reason, priority = %decision.priority, "priority resolved");

        Query {
            id: Uuid::new_v4(),
            channel_id: new.channel_id,
            category: new
                .category
                .clone()
                .or_else(|| classification.as_ref().map(|c| c.category.clone())),
            subject: event.subject.clone(),
            content: event.content.clone(),
            sender_name: event.sender_name.clone(),
            sender_address: event.sender_address.clone(),
            sentiment,
            intent: trusted.map(|c| c.intent.clone()),
            confidence: trusted.map(|c| c.category_confidence).unwrap_or(0.0),
            auto_tags: trusted.map(|c| c.auto_tags.clone()).unwrap_or_default(),
            priority: decision.priority,
            status: QueryStatus::New,
            is_vip,
            is_urgent: is_urgent(
                decision.priority,
                trusted.map(|c| c.is_urgent).unwrap_or(false),
            ),
            external_key: event.external_key.clone(),
            thread_key: event.thread_key.clone(),
            attachments: event.attachments.clone(),
            metadata: event.metadata.clone(),
            received_at: now,
            assigned_at: None,
            resolved_at: None,
            closed_at: None,
            sla_due_at: sla_due(decision.priority, now),
        }
    }

    pub async fn get_query(&self, id: Uuid) -> Result<Query, DeskError> {
        self.storage
            .get_query(id)
            .await?
            .ok_or_else(|| DeskError::NotFound {
                kind: "query",
                id: id.to_string(),
            })
    }

    /// Apply a partial update. Changing priority moves the SLA deadline to
    /// `now + window(new priority)`; the original deadline is discarded.
    pub async fn update_query(&self, id: Uuid, update: QueryUpdate) -> Result<Query, DeskError> {
        let query = self.get_query(id).await?;

        let mut patch = QueryPatch {
            category: update.category,
            is_vip: update.is_vip,
            ..QueryPatch::default()
        };
        if let Some(priority) = update.priority {
            if priority != query.priority {
                let due = sla_due(priority, Utc::now());
                info!(query_id = %id, %priority, sla_due_at = %due, "priority changed");
                patch.priority = Some((priority, due));
            }
        }
        if let Some(status) = update.status {
            if status != query.status {
                warn_on_backward(query.status, status);
            }
            patch.status = Some(status);
        }
        if patch.is_empty() {
            return Ok(query);
        }

        self.storage.patch_query(id, patch).await?;
        self.get_query(id).await
    }

    /// Assign a query to a user. Assigning the same user twice is an
    /// error; a query in NEW moves to ASSIGNED on its first assignment.
    pub async fn assign_query(
        &self,
        query_id: Uuid,
        user_id: Uuid,
        assigned_by: Uuid,
        notes: Option<String>,
    ) -> Result<Assignment, DeskError> {
        self.get_query(query_id).await?;

        let assignment = Assignment {
            id: Uuid::new_v4(),
            query_id,
            user_id,
            assigned_by,
            notes,
            created_at: Utc::now(),
        };
        if !self.storage.insert_assignment(&assignment).await? {
            return Err(DeskError::DuplicateAssignment { query_id, user_id });
        }

        if self
            .storage
            .mark_query_assigned(query_id, assignment.created_at)
            .await?
        {
            debug!(%query_id, "query moved to ASSIGNED");
        }
        info!(%query_id, %user_id, "query assigned");
        Ok(assignment)
    }

    /// Record a response. A non-internal response to a NEW or ASSIGNED
    /// query moves it to IN_PROGRESS; internal notes never change state.
    pub async fn add_response(
        &self,
        query_id: Uuid,
        user_id: Uuid,
        content: String,
        is_internal: bool,
    ) -> Result<QueryResponse, DeskError> {
        self.get_query(query_id).await?;

        let response = QueryResponse {
            id: Uuid::new_v4(),
            query_id,
            user_id,
            content,
            is_internal,
            sent_at: Utc::now(),
        };
        self.storage.insert_response(&response).await?;

        if !is_internal && self.storage.mark_query_in_progress(query_id).await? {
            debug!(%query_id, "first public response, query moved to IN_PROGRESS");
        }
        Ok(response)
    }

    /// Administrative status override. Stamps `resolved_at`/`closed_at`
    /// when entering those states for the first time.
    pub async fn set_status(&self, id: Uuid, status: QueryStatus) -> Result<Query, DeskError> {
        let query = self.get_query(id).await?;
        if query.status == status {
            return Ok(query);
        }
        warn_on_backward(query.status, status);
        self.storage
            .patch_query(
                id,
                QueryPatch {
                    status: Some(status),
                    ..QueryPatch::default()
                },
            )
            .await?;
        info!(query_id = %id, %status, "status changed");
        self.get_query(id).await
    }
}

fn warn_on_backward(from: QueryStatus, to: QueryStatus) {
    let rank = |s: QueryStatus| match s {
        QueryStatus::New => 0,
        QueryStatus::Assigned => 1,
        QueryStatus::InProgress => 2,
        QueryStatus::Resolved => 3,
        QueryStatus::Closed => 4,
    };
    if rank(to) < rank(from) {
        warn!(%from, %to, "backward status transition (administrative override)");
    }
}

fn analyze_request(new: &NewQuery, channel_type: ChannelType) -> AnalyzeRequest {
    let event = &new.event;
    let request = AnalyzeRequest::new(event.content.clone())
        .subject(event.subject.clone())
        .channel_type(channel_type);
    match channel_type {
        ChannelType::Mail => request.sender_email(Some(event.sender_address.clone())),
        _ => request.sender_id(Some(event.sender_address.clone())),
    }
}
