// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The social channel connector.
//!
//! Two ingestion paths share one normalizer: the mentions poll loop and
//! [`SocialConnector::ingest_webhook`] for providers that push. Both
//! paths funnel through the lifecycle dedup, so a mention observed via
//! webhook and then again via polling still creates one query.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use querydesk_core::{
    Attachment, Channel, ChannelType, ConnectionTest, Connector, ConnectorStatus, DeskError,
    InboundEvent, NewQuery, PollTask, Query, QueryResponse, RuntimeState,
};
use querydesk_lifecycle::QueryLifecycle;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::{SocialApi, SocialPost};
use crate::config::SocialConfig;

/// Polls the mentions timeline and accepts webhook pushes.
pub struct SocialConnector {
    channel: Channel,
    lifecycle: QueryLifecycle,
    state: Arc<RuntimeState>,
    poll_interval: Duration,
    shutdown_grace: Duration,
    worker: Option<Arc<Worker>>,
    task: Option<PollTask>,
}

struct Worker {
    api: SocialApi,
    lifecycle: QueryLifecycle,
    channel_id: Uuid,
    /// Highest status id seen; mentions at or below it are not re-fetched.
    since_id: Mutex<i64>,
}

impl Worker {
    async fn poll_once(&self) -> Result<usize, DeskError> {
        let mut since_id = self.since_id.lock().await;
        let posts = self.api.mentions(*since_id).await?;
        let mut ingested = 0;
        for post in &posts {
            if post.id > *since_id {
                *since_id = post.id;
            }
            match self
                .lifecycle
                .create_query(NewQuery::from_event(self.channel_id, to_event(post)))
                .await
            {
                Ok(query) => {
                    debug!(channel_id = %self.channel_id, query_id = %query.id, "mention ingested");
                    ingested += 1;
                }
                Err(e) => {
                    warn!(
                        channel_id = %self.channel_id,
                        status_id = post.id,
                        error = %e,
                        "failed to ingest mention"
                    );
                }
            }
        }
        Ok(ingested)
    }
}

fn to_event(post: &SocialPost) -> InboundEvent {
    let mut metadata = HashMap::new();
    metadata.insert("status_id".to_string(), post.id.to_string());
    metadata.insert("handle".to_string(), post.user.screen_name.clone());

    InboundEvent {
        content: post.text.clone(),
        subject: None,
        sender_name: post.user.name.clone(),
        sender_address: format!("@{}", post.user.screen_name),
        external_key: post.id.to_string(),
        thread_key: post
            .in_reply_to_status_id
            .map(|id| id.to_string())
            .or_else(|| Some(post.id.to_string())),
        attachments: Vec::new(),
        metadata,
    }
}

impl SocialConnector {
    pub fn new(
        channel: Channel,
        lifecycle: QueryLifecycle,
        poll_interval: Duration,
        shutdown_grace: Duration,
    ) -> Self {
        let state = Arc::new(RuntimeState::for_channel(&channel));
        Self {
            channel,
            lifecycle,
            state,
            poll_interval,
            shutdown_grace,
            worker: None,
            task: None,
        }
    }

    fn worker(&self) -> Result<Arc<Worker>, DeskError> {
        self.worker
            .clone()
            .ok_or_else(|| DeskError::Internal("social connector used before initialize".into()))
    }

    /// Ingest a provider webhook payload (one status object). Returns the
    /// created or existing query.
    pub async fn ingest_webhook(&self, payload: &serde_json::Value) -> Result<Query, DeskError> {
        let post: SocialPost = serde_json::from_value(payload.clone())
            .map_err(|e| DeskError::Config(format!("unrecognized webhook payload: {e}")))?;
        self.lifecycle
            .create_query(NewQuery::from_event(self.channel.id, to_event(&post)))
            .await
    }
}

#[async_trait]
impl Connector for SocialConnector {
    fn channel_id(&self) -> Uuid {
        self.channel.id
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Social
    }

    async fn initialize(&mut self) -> Result<(), DeskError> {
        let config = SocialConfig::from_channel(&self.channel)?;
        if let Some(interval) = config.poll_interval {
            self.poll_interval = interval;
        }
        self.worker = Some(Arc::new(Worker {
            api: SocialApi::new(&config)?,
            lifecycle: self.lifecycle.clone(),
            channel_id: self.channel.id,
            since_id: Mutex::new(0),
        }));
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeskError> {
        if self.task.is_some() {
            warn!(channel_id = %self.channel.id, "social connector already started");
            return Ok(());
        }
        let worker = self.worker()?;

        worker.poll_once().await?;
        self.state.record_poll();

        let pass_worker = Arc::clone(&worker);
        let channel_id = self.channel.id;
        let task = PollTask::spawn(Arc::clone(&self.state), self.poll_interval, move || {
            let worker = Arc::clone(&pass_worker);
            async move {
                if let Err(e) = worker.poll_once().await {
                    warn!(%channel_id, error = %e, "mentions poll pass failed");
                }
            }
        });
        self.task = Some(task);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), DeskError> {
        match self.task.take() {
            Some(task) => task.shutdown(self.shutdown_grace).await,
            None => Ok(()),
        }
    }

    async fn test_connection(&self) -> ConnectionTest {
        let worker = match self.worker() {
            Ok(w) => w,
            Err(e) => return ConnectionTest::failed(e.to_string()),
        };
        match worker.api.verify_credentials().await {
            Ok(account) => {
                ConnectionTest::ok(format!("authenticated as @{}", account.screen_name))
            }
            Err(e) => ConnectionTest::failed(e.to_string()),
        }
    }

    async fn send_reply(
        &self,
        query_id: Uuid,
        user_id: Uuid,
        content: &str,
        attachments: &[Attachment],
    ) -> Result<QueryResponse, DeskError> {
        let query = self.lifecycle.get_query(query_id).await?;
        if query.channel_id != self.channel.id {
            return Err(DeskError::Send {
                message: format!("query {query_id} belongs to another channel"),
                source: None,
            });
        }
        if !attachments.is_empty() {
            warn!(%query_id, "social attachments are not supported, posting text only");
        }

        let status_id: i64 = query
            .metadata
            .get("status_id")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| DeskError::Send {
                message: format!("query {query_id} has no status_id metadata"),
                source: None,
            })?;

        // Providers require the reply to mention the original author.
        let text = match query.metadata.get("handle") {
            Some(handle) if !content.contains(&format!("@{handle}")) => {
                format!("@{handle} {content}")
            }
            _ => content.to_string(),
        };
        self.worker()?.api.post_reply(&text, status_id).await?;

        self.lifecycle
            .add_response(query_id, user_id, content.to_string(), false)
            .await
    }

    fn status(&self) -> ConnectorStatus {
        self.state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SocialAccount;

    #[test]
    fn event_keys_on_status_id() {
        let post = SocialPost {
            id: 12345,
            text: "@deskbot my order never arrived".into(),
            user: SocialAccount {
                id: 7,
                screen_name: "ada".into(),
                name: Some("Ada".into()),
            },
            in_reply_to_status_id: None,
        };
        let event = to_event(&post);
        assert_eq!(event.external_key, "12345");
        assert_eq!(event.sender_address, "@ada");
        assert_eq!(event.thread_key.as_deref(), Some("12345"));
        assert_eq!(event.metadata["status_id"], "12345");
    }

    #[test]
    fn reply_chains_thread_to_parent() {
        let post = SocialPost {
            id: 200,
            text: "still broken".into(),
            user: SocialAccount {
                id: 7,
                screen_name: "ada".into(),
                name: None,
            },
            in_reply_to_status_id: Some(100),
        };
        let event = to_event(&post);
        assert_eq!(event.thread_key.as_deref(), Some("100"));
    }
}
