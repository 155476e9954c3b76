// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat channel connector.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use querydesk_core::{
    Attachment, Channel, ChannelType, ConnectionTest, Connector, ConnectorStatus, DeskError,
    InboundEvent, NewQuery, PollTask, QueryResponse, RuntimeState,
};
use querydesk_lifecycle::QueryLifecycle;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::{ChatApi, ChatMessage};
use crate::config::ChatConfig;

/// Polls the bot update feed and replies in-thread.
pub struct ChatConnector {
    channel: Channel,
    lifecycle: QueryLifecycle,
    state: Arc<RuntimeState>,
    poll_interval: Duration,
    shutdown_grace: Duration,
    worker: Option<Arc<Worker>>,
    task: Option<PollTask>,
}

/// Shared poll state: the API handle plus the update offset cursor. The
/// cursor makes each update observed exactly once across passes.
struct Worker {
    api: ChatApi,
    lifecycle: QueryLifecycle,
    channel_id: Uuid,
    offset: Mutex<i64>,
}

impl Worker {
    async fn poll_once(&self) -> Result<usize, DeskError> {
        let mut offset = self.offset.lock().await;
        let updates = self.api.get_updates(*offset).await?;
        let mut ingested = 0;
        for update in updates {
            if update.update_id >= *offset {
                *offset = update.update_id + 1;
            }
            let Some(message) = update.message else {
                continue;
            };
            let Some(event) = to_event(&message) else {
                debug!(
                    channel_id = %self.channel_id,
                    message_id = message.message_id,
                    "skipping non-text message"
                );
                continue;
            };
            match self
                .lifecycle
                .create_query(NewQuery::from_event(self.channel_id, event))
                .await
            {
                Ok(query) => {
                    debug!(channel_id = %self.channel_id, query_id = %query.id, "chat message ingested");
                    ingested += 1;
                }
                Err(e) => {
                    warn!(
                        channel_id = %self.channel_id,
                        message_id = message.message_id,
                        error = %e,
                        "failed to ingest chat message"
                    );
                }
            }
        }
        Ok(ingested)
    }
}

fn to_event(message: &ChatMessage) -> Option<InboundEvent> {
    let text = message.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    let from = message.from.as_ref()?;

    let mut metadata = HashMap::new();
    metadata.insert("chat_id".to_string(), message.chat.id.to_string());
    metadata.insert("message_id".to_string(), message.message_id.to_string());

    Some(InboundEvent {
        content: text.to_string(),
        subject: message.chat.title.clone(),
        sender_name: from
            .first_name
            .clone()
            .or_else(|| from.username.clone()),
        sender_address: from.id.to_string(),
        external_key: format!("{}:{}", message.chat.id, message.message_id),
        thread_key: Some(message.chat.id.to_string()),
        attachments: Vec::new(),
        metadata,
    })
}

impl ChatConnector {
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
            .ok_or_else(|| DeskError::Internal("chat connector used before initialize".into()))
    }
}

#[async_trait]
impl Connector for ChatConnector {
    fn channel_id(&self) -> Uuid {
        self.channel.id
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Chat
    }

    async fn initialize(&mut self) -> Result<(), DeskError> {
        let config = ChatConfig::from_channel(&self.channel)?;
        if let Some(interval) = config.poll_interval {
            self.poll_interval = interval;
        }
        self.worker = Some(Arc::new(Worker {
            api: ChatApi::new(&config)?,
            lifecycle: self.lifecycle.clone(),
            channel_id: self.channel.id,
            offset: Mutex::new(0),
        }));
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeskError> {
        if self.task.is_some() {
            warn!(channel_id = %self.channel.id, "chat connector already started");
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
                    warn!(%channel_id, error = %e, "chat poll pass failed");
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
        match worker.api.get_me().await {
            Ok(me) => ConnectionTest::ok(format!(
                "authenticated as @{}",
                me.username.unwrap_or_else(|| me.id.to_string())
            )),
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
            warn!(%query_id, "chat attachments are not supported, sending text only");
        }

        let chat_id: i64 = query
            .metadata
            .get("chat_id")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| DeskError::Send {
                message: format!("query {query_id} has no chat_id metadata"),
                source: None,
            })?;
        let reply_to = query
            .metadata
            .get("message_id")
            .and_then(|v| v.parse().ok());

        self.worker()?
            .api
            .send_message(chat_id, content, reply_to)
            .await?;

        self.lifecycle
            .add_response(query_id, user_id, content.to_string(), false)
            .await
    }

    fn status(&self) -> ConnectorStatus {
        self.state.snapshot()
    }
}
