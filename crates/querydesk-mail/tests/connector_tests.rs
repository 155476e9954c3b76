// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail connector tests with a scripted gateway.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use querydesk_core::{ChannelType, Connector, DeskError, QueryStatus};
use querydesk_lifecycle::QueryLifecycle;
use querydesk_mail::{MailConnector, MailGateway, OutgoingMail, RawMail};
use querydesk_test_utils::{seed_channel, temp_storage};
use uuid::Uuid;

const INTERVAL: Duration = Duration::from_secs(60);
const GRACE: Duration = Duration::from_secs(2);

#[derive(Default)]
struct ScriptedGateway {
    inbox: Mutex<Vec<RawMail>>,
    sent: Mutex<Vec<OutgoingMail>>,
    fail_fetch: Mutex<bool>,
}

impl ScriptedGateway {
    fn queue(&self, uid: u32, body: &str) {
        self.inbox.lock().unwrap().push(RawMail {
            uid,
            body: body.replace('\n', "\r\n").into_bytes(),
        });
    }
}

#[async_trait]
impl MailGateway for ScriptedGateway {
    async fn fetch_unseen(&self) -> Result<Vec<RawMail>, DeskError> {
        if *self.fail_fetch.lock().unwrap() {
            return Err(DeskError::Connection {
                message: "mailbox unreachable".into(),
                source: None,
            });
        }
        Ok(std::mem::take(&mut *self.inbox.lock().unwrap()))
    }

    async fn check(&self) -> Result<String, DeskError> {
        if *self.fail_fetch.lock().unwrap() {
            return Err(DeskError::Connection {
                message: "mailbox unreachable".into(),
                source: None,
            });
        }
        Ok("authenticated".into())
    }

    async fn send(&self, mail: OutgoingMail) -> Result<(), DeskError> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

fn message(id: &str, from: &str, subject: &str, body: &str) -> String {
    format!("Message-ID: <{id}>\nFrom: {from}\nSubject: {subject}\n\n{body}\n")
}

async fn connector_with_gateway() -> (
    MailConnector,
    Arc<ScriptedGateway>,
    QueryLifecycle,
    Uuid,
    tempfile::TempDir,
) {
    let (storage, dir) = temp_storage().await;
    let channel = seed_channel(
        &storage,
        ChannelType::Mail,
        &[
            ("imap_host", "mail.example.com"),
            ("imap_username", "support@example.com"),
            ("imap_password", "pw"),
            ("smtp_host", "smtp.example.com"),
        ],
    )
    .await;
    let lifecycle = QueryLifecycle::new(storage, None);
    let gateway = Arc::new(ScriptedGateway::default());
    let connector = MailConnector::with_gateway(
        channel.clone(),
        lifecycle.clone(),
        INTERVAL,
        GRACE,
        Arc::clone(&gateway) as Arc<dyn MailGateway>,
    );
    (connector, gateway, lifecycle, channel.id, dir)
}

#[tokio::test]
async fn start_ingests_queued_mail() {
    let (mut connector, gateway, lifecycle, channel_id, _dir) = connector_with_gateway().await;
    gateway.queue(1, &message("m1@x", "Ada <ada@example.com>", "Help", "It broke"));
    gateway.queue(2, &message("m2@x", "Bob <bob@example.com>", "Question", "How do I...?"));

    connector.initialize().await.unwrap();
    connector.start().await.unwrap();

    let queries = lifecycle
        .storage()
        .list_queries_for_channel(channel_id)
        .await
        .unwrap();
    assert_eq!(queries.len(), 2);
    assert!(connector.status().running);
    assert!(connector.status().last_poll_at.is_some());

    connector.stop().await.unwrap();
    assert!(!connector.status().running);
}

#[tokio::test]
async fn duplicate_message_id_ingested_once() {
    let (mut connector, gateway, lifecycle, channel_id, _dir) = connector_with_gateway().await;
    let body = message("same@x", "ada@example.com", "Hi", "hello");
    gateway.queue(1, &body);
    gateway.queue(2, &body);

    connector.initialize().await.unwrap();
    connector.start().await.unwrap();
    connector.stop().await.unwrap();

    let queries = lifecycle
        .storage()
        .list_queries_for_channel(channel_id)
        .await
        .unwrap();
    assert_eq!(queries.len(), 1);
}

#[tokio::test]
async fn bad_message_does_not_block_the_batch() {
    let (mut connector, gateway, lifecycle, channel_id, _dir) = connector_with_gateway().await;
    gateway.queue(1, "Subject: no sender\n\norphan\n");
    gateway.queue(2, &message("ok@x", "ada@example.com", "Fine", "works"));

    connector.initialize().await.unwrap();
    connector.start().await.unwrap();
    connector.stop().await.unwrap();

    let queries = lifecycle
        .storage()
        .list_queries_for_channel(channel_id)
        .await
        .unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].external_key, "<ok@x>");
}

#[tokio::test]
async fn start_fails_when_mailbox_unreachable() {
    let (mut connector, gateway, _lifecycle, _channel_id, _dir) = connector_with_gateway().await;
    *gateway.fail_fetch.lock().unwrap() = true;

    connector.initialize().await.unwrap();
    assert!(connector.start().await.is_err());
    assert!(!connector.status().running);
}

#[tokio::test]
async fn connection_test_reflects_gateway_health() {
    let (mut connector, gateway, _lifecycle, _channel_id, _dir) = connector_with_gateway().await;
    connector.initialize().await.unwrap();

    assert!(connector.test_connection().await.ok);
    *gateway.fail_fetch.lock().unwrap() = true;
    assert!(!connector.test_connection().await.ok);
}

#[tokio::test]
async fn reply_goes_to_reply_to_and_threads() {
    let (mut connector, gateway, lifecycle, channel_id, _dir) = connector_with_gateway().await;
    gateway.queue(
        1,
        "Message-ID: <q1@x>\nFrom: Ada <ada@example.com>\nReply-To: replies@example.com\nSubject: Broken\n\nplease help\n",
    );
    connector.initialize().await.unwrap();
    connector.start().await.unwrap();
    connector.stop().await.unwrap();

    let query = &lifecycle
        .storage()
        .list_queries_for_channel(channel_id)
        .await
        .unwrap()[0];
    let agent = Uuid::new_v4();
    let response = connector
        .send_reply(query.id, agent, "On it.", &[])
        .await
        .unwrap();
    assert!(!response.is_internal);

    let sent = gateway.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "replies@example.com");
    assert_eq!(sent[0].subject, "Re: Broken");
    assert_eq!(sent[0].in_reply_to.as_deref(), Some("<q1@x>"));
    drop(sent);

    // A public reply moves the query forward.
    let after = lifecycle.get_query(query.id).await.unwrap();
    assert_eq!(after.status, QueryStatus::InProgress);
}

#[tokio::test]
async fn reply_to_foreign_query_is_rejected() {
    let (mut connector, _gateway, lifecycle, _channel_id, _dir) = connector_with_gateway().await;
    connector.initialize().await.unwrap();

    // A query on a different channel.
    let other_channel = seed_channel(lifecycle.storage(), ChannelType::Chat, &[]).await;
    let foreign = lifecycle
        .create_query(querydesk_core::NewQuery::from_event(
            other_channel.id,
            querydesk_test_utils::sample_event("chat-1"),
        ))
        .await
        .unwrap();

    let err = connector
        .send_reply(foreign.id, Uuid::new_v4(), "hi", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Send { .. }));
}
