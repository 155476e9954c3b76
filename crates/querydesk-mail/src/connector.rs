// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mail channel connector.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use querydesk_core::{
    Attachment, Channel, ChannelType, ConnectionTest, Connector, ConnectorStatus, DeskError,
    NewQuery, PollTask, QueryResponse, RuntimeState,
};
use querydesk_lifecycle::QueryLifecycle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MailConfig;
use crate::gateway::{ImapSmtpGateway, MailGateway, OutgoingMail};
use crate::parse;

/// Polls an IMAP mailbox for unseen mail and answers over SMTP.
pub struct MailConnector {
    channel: Channel,
    lifecycle: QueryLifecycle,
    state: Arc<RuntimeState>,
    poll_interval: Duration,
    shutdown_grace: Duration,
    gateway: Option<Arc<dyn MailGateway>>,
    injected: Option<Arc<dyn MailGateway>>,
    task: Option<PollTask>,
}

impl MailConnector {
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
            gateway: None,
            injected: None,
            task: None,
        }
    }

    /// Test constructor: bypasses the real IMAP/SMTP gateway.
    pub fn with_gateway(
        channel: Channel,
        lifecycle: QueryLifecycle,
        poll_interval: Duration,
        shutdown_grace: Duration,
        gateway: Arc<dyn MailGateway>,
    ) -> Self {
        let mut connector = Self::new(channel, lifecycle, poll_interval, shutdown_grace);
        connector.injected = Some(gateway);
        connector
    }

    fn gateway(&self) -> Result<Arc<dyn MailGateway>, DeskError> {
        self.gateway
            .clone()
            .ok_or_else(|| DeskError::Internal("mail connector used before initialize".into()))
    }
}

/// One ingestion pass: fetch, parse, create. A message that fails to
/// parse or persist is logged and skipped; it never blocks the rest of
/// the batch.
async fn run_pass(
    gateway: &Arc<dyn MailGateway>,
    lifecycle: &QueryLifecycle,
    channel_id: Uuid,
) -> Result<usize, DeskError> {
    let messages = gateway.fetch_unseen().await?;
    let mut ingested = 0;
    for raw in &messages {
        let Some(event) = parse::to_event(raw) else {
            warn!(%channel_id, uid = raw.uid, "skipping unparsable message");
            continue;
        };
        match lifecycle
            .create_query(NewQuery::from_event(channel_id, event))
            .await
        {
            Ok(query) => {
                debug!(%channel_id, query_id = %query.id, uid = raw.uid, "mail ingested");
                ingested += 1;
            }
            Err(e) => {
                warn!(%channel_id, uid = raw.uid, error = %e, "failed to ingest message");
            }
        }
    }
    Ok(ingested)
}

#[async_trait]
impl Connector for MailConnector {
    fn channel_id(&self) -> Uuid {
        self.channel.id
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Mail
    }

    async fn initialize(&mut self) -> Result<(), DeskError> {
        let config = MailConfig::from_channel(&self.channel)?;
        if let Some(interval) = config.poll_interval {
            self.poll_interval = interval;
        }
        self.gateway = match &self.injected {
            Some(gateway) => Some(Arc::clone(gateway)),
            None => Some(Arc::new(ImapSmtpGateway::new(config)?)),
        };
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeskError> {
        if self.task.is_some() {
            warn!(channel_id = %self.channel.id, "mail connector already started");
            return Ok(());
        }
        let gateway = self.gateway()?;

        // Initial pass runs inline so a dead mailbox fails the start
        // instead of a background task.
        run_pass(&gateway, &self.lifecycle, self.channel.id).await?;
        self.state.record_poll();

        let lifecycle = self.lifecycle.clone();
        let channel_id = self.channel.id;
        let task = PollTask::spawn(Arc::clone(&self.state), self.poll_interval, move || {
            let gateway = Arc::clone(&gateway);
            let lifecycle = lifecycle.clone();
            async move {
                if let Err(e) = run_pass(&gateway, &lifecycle, channel_id).await {
                    warn!(%channel_id, error = %e, "mail poll pass failed");
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
        match self.gateway() {
            Ok(gateway) => match gateway.check().await {
                Ok(summary) => ConnectionTest::ok(summary),
                Err(e) => ConnectionTest::failed(e.to_string()),
            },
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
            warn!(%query_id, "outbound mail attachments are not supported, sending text only");
        }

        let to = query
            .metadata
            .get("reply_to")
            .cloned()
            .unwrap_or_else(|| query.sender_address.clone());
        let subject = match &query.subject {
            Some(s) if s.to_lowercase().starts_with("re:") => s.clone(),
            Some(s) => format!("Re: {s}"),
            None => "Re: your message".to_string(),
        };

        self.gateway()?
            .send(OutgoingMail {
                to,
                subject,
                body: content.to_string(),
                in_reply_to: Some(query.external_key.clone()),
            })
            .await?;

        self.lifecycle
            .add_response(query_id, user_id, content.to_string(), false)
            .await
    }

    fn status(&self) -> ConnectorStatus {
        self.state.snapshot()
    }
}
