// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal bot-API client.
//!
//! Speaks the Telegram-style bot HTTP API directly: every call is
//! `{base}/bot{token}/{method}` returning `{"ok": bool, "result": ...}`.
//! Only the three methods the connector needs are implemented.

use querydesk_core::DeskError;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::ChatConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct BotProfile {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRef {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub message_id: i64,
    pub chat: ChatRef,
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client bound to one bot token.
#[derive(Debug, Clone)]
pub struct ChatApi {
    http: reqwest::Client,
    base_url: String,
}

impl ChatApi {
    pub fn new(config: &ChatConfig) -> Result<Self, DeskError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| DeskError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: format!(
                "{}/bot{}",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
        })
    }

    /// Identify the bot account behind the token.
    pub async fn get_me(&self) -> Result<BotProfile, DeskError> {
        self.call("getMe", &json!({})).await
    }

    /// Fetch updates after `offset`. Confirms earlier updates server-side,
    /// so each update is delivered once.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, DeskError> {
        let updates: Vec<Update> = self
            .call("getUpdates", &json!({ "offset": offset, "timeout": 0 }))
            .await?;
        debug!(count = updates.len(), offset, "fetched chat updates");
        Ok(updates)
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<ChatMessage, DeskError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(id) = reply_to_message_id {
            body["reply_to_message_id"] = json!(id);
        }
        self.call("sendMessage", &body).await
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, DeskError> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| DeskError::Connection {
                message: format!("chat API {method} failed"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeskError::Connection {
                message: format!("chat API {method} returned {status}"),
                source: None,
            });
        }
        let envelope: ApiEnvelope<T> =
            response.json().await.map_err(|e| DeskError::Connection {
                message: format!("chat API {method} returned invalid JSON"),
                source: Some(Box::new(e)),
            })?;
        if !envelope.ok {
            return Err(DeskError::Connection {
                message: format!(
                    "chat API {method} rejected: {}",
                    envelope.description.unwrap_or_else(|| "no description".into())
                ),
                source: None,
            });
        }
        envelope.result.ok_or_else(|| DeskError::Connection {
            message: format!("chat API {method} returned ok with no result"),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> ChatApi {
        ChatApi::new(&ChatConfig {
            bot_token: "123:abc".into(),
            api_base: server.uri(),
            poll_interval: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn get_me_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/getMe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"id": 42, "username": "desk_bot", "first_name": "Desk"}
            })))
            .mount(&server)
            .await;

        let me = api_for(&server).get_me().await.unwrap();
        assert_eq!(me.id, 42);
        assert_eq!(me.username.as_deref(), Some("desk_bot"));
    }

    #[tokio::test]
    async fn rejected_call_surfaces_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/getMe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let err = api_for(&server).get_me().await.unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn get_updates_passes_offset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .and(body_partial_json(serde_json::json!({"offset": 17})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 17, "message": {
                        "message_id": 5,
                        "chat": {"id": 900},
                        "from": {"id": 7, "first_name": "Ada"},
                        "text": "hello"
                    }},
                    {"update_id": 18}
                ]
            })))
            .mount(&server)
            .await;

        let updates = api_for(&server).get_updates(17).await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("hello"));
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn send_message_includes_reply_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": 900,
                "reply_to_message_id": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 6, "chat": {"id": 900}, "text": "done"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sent = api_for(&server)
            .send_message(900, "done", Some(5))
            .await
            .unwrap();
        assert_eq!(sent.message_id, 6);
    }
}
