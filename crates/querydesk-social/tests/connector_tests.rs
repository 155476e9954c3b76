// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Social connector tests against a mock provider API.

use std::time::Duration;

use querydesk_core::{ChannelType, Connector, QueryStatus};
use querydesk_lifecycle::QueryLifecycle;
use querydesk_social::SocialConnector;
use querydesk_test_utils::{seed_channel, temp_storage};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTERVAL: Duration = Duration::from_secs(60);
const GRACE: Duration = Duration::from_secs(2);

async fn connector_for(
    server: &MockServer,
) -> (SocialConnector, QueryLifecycle, Uuid, tempfile::TempDir) {
    let (storage, dir) = temp_storage().await;
    let channel = seed_channel(
        &storage,
        ChannelType::Social,
        &[("api_base", &server.uri()), ("access_token", "tok-1")],
    )
    .await;
    let lifecycle = QueryLifecycle::new(storage, None);
    let connector = SocialConnector::new(channel.clone(), lifecycle.clone(), INTERVAL, GRACE);
    (connector, lifecycle, channel.id, dir)
}

fn mention(id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "text": text,
        "user": {"id": 7, "screen_name": "ada", "name": "Ada"}
    })
}

#[tokio::test]
async fn start_ingests_mentions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/statuses/mentions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            mention(101, "@deskbot order missing"),
            mention(102, "@deskbot website is down"),
        ])))
        .mount(&server)
        .await;

    let (mut connector, lifecycle, channel_id, _dir) = connector_for(&server).await;
    connector.initialize().await.unwrap();
    connector.start().await.unwrap();
    connector.stop().await.unwrap();

    let queries = lifecycle
        .storage()
        .list_queries_for_channel(channel_id)
        .await
        .unwrap();
    assert_eq!(queries.len(), 2);
    let keys: Vec<&str> = queries.iter().map(|q| q.external_key.as_str()).collect();
    assert!(keys.contains(&"101"));
    assert!(keys.contains(&"102"));
}

#[tokio::test]
async fn next_pass_uses_the_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/statuses/mentions"))
        .and(query_param("since_id", "101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/statuses/mentions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([mention(101, "@deskbot hi")])),
        )
        .mount(&server)
        .await;

    let (mut connector, lifecycle, channel_id, _dir) = connector_for(&server).await;
    connector.initialize().await.unwrap();
    connector.start().await.unwrap();
    connector.stop().await.unwrap();
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
async fn webhook_push_creates_and_dedups() {
    let server = MockServer::start().await;
    let (mut connector, lifecycle, channel_id, _dir) = connector_for(&server).await;
    connector.initialize().await.unwrap();

    let payload = mention(500, "@deskbot urgent: account locked");
    let first = connector.ingest_webhook(&payload).await.unwrap();
    let second = connector.ingest_webhook(&payload).await.unwrap();
    assert_eq!(first.id, second.id);

    let queries = lifecycle
        .storage()
        .list_queries_for_channel(channel_id)
        .await
        .unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].external_key, "500");
}

#[tokio::test]
async fn malformed_webhook_is_rejected() {
    let server = MockServer::start().await;
    let (mut connector, _lifecycle, _channel_id, _dir) = connector_for(&server).await;
    connector.initialize().await.unwrap();

    let err = connector
        .ingest_webhook(&serde_json::json!({"not": "a status"}))
        .await
        .unwrap_err();
    assert!(matches!(err, querydesk_core::DeskError::Config(_)));
}

#[tokio::test]
async fn connection_test_verifies_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account/verify_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 42, "screen_name": "deskbot"
        })))
        .mount(&server)
        .await;

    let (mut connector, _lifecycle, _channel_id, _dir) = connector_for(&server).await;
    connector.initialize().await.unwrap();
    let test = connector.test_connection().await;
    assert!(test.ok);
    assert!(test.message.contains("deskbot"));
}

#[tokio::test]
async fn reply_mentions_author_and_threads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/statuses/mentions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([mention(300, "@deskbot broken")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/statuses/update"))
        .and(body_partial_json(serde_json::json!({
            "status": "@ada we shipped a fix",
            "in_reply_to_status_id": 300
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 301,
            "text": "@ada we shipped a fix",
            "user": {"id": 42, "screen_name": "deskbot"},
            "in_reply_to_status_id": 300
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut connector, lifecycle, channel_id, _dir) = connector_for(&server).await;
    connector.initialize().await.unwrap();
    connector.start().await.unwrap();
    connector.stop().await.unwrap();

    let query = &lifecycle
        .storage()
        .list_queries_for_channel(channel_id)
        .await
        .unwrap()[0];
    connector
        .send_reply(query.id, Uuid::new_v4(), "we shipped a fix", &[])
        .await
        .unwrap();

    let after = lifecycle.get_query(query.id).await.unwrap();
    assert_eq!(after.status, QueryStatus::InProgress);
}
