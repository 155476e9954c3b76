// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for the social provider.
//!
//! Assumes a Twitter-style surface: bearer-token auth, numeric status
//! ids, a mentions timeline filterable with `since_id`, and a status
//! update endpoint accepting `in_reply_to_status_id`.

use querydesk_core::DeskError;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::SocialConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct SocialAccount {
    pub id: i64,
    pub screen_name: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialPost {
    pub id: i64,
    pub text: String,
    pub user: SocialAccount,
    #[serde(default)]
    pub in_reply_to_status_id: Option<i64>,
}

/// HTTP client bound to one account's token.
#[derive(Debug, Clone)]
pub struct SocialApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SocialApi {
    pub fn new(config: &SocialConfig) -> Result<Self, DeskError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| DeskError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            token: config.access_token.clone(),
        })
    }

    /// The account behind the token.
    pub async fn verify_credentials(&self) -> Result<SocialAccount, DeskError> {
        let url = format!("{}/account/verify_credentials", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport_err)?;
        decode(response, "verify_credentials").await
    }

    /// Mentions newer than `since_id` (0 for all available).
    pub async fn mentions(&self, since_id: i64) -> Result<Vec<SocialPost>, DeskError> {
        let url = format!("{}/statuses/mentions", self.base_url);
        let mut request = self.http.get(&url).bearer_auth(&self.token);
        if since_id > 0 {
            request = request.query(&[("since_id", since_id.to_string())]);
        }
        let response = request.send().await.map_err(transport_err)?;
        let posts: Vec<SocialPost> = decode(response, "mentions").await?;
        debug!(count = posts.len(), since_id, "fetched mentions");
        Ok(posts)
    }

    pub async fn post_reply(
        &self,
        text: &str,
        in_reply_to_status_id: i64,
    ) -> Result<SocialPost, DeskError> {
        let url = format!("{}/statuses/update", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({
                "status": text,
                "in_reply_to_status_id": in_reply_to_status_id,
            }))
            .send()
            .await
            .map_err(transport_err)?;
        decode(response, "statuses/update").await
    }
}

fn transport_err(e: reqwest::Error) -> DeskError {
    DeskError::Connection {
        message: "social API request failed".into(),
        source: Some(Box::new(e)),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T, DeskError> {
    let status = response.status();
    if !status.is_success() {
        return Err(DeskError::Connection {
            message: format!("social API {endpoint} returned {status}"),
            source: None,
        });
    }
    response.json().await.map_err(|e| DeskError::Connection {
        message: format!("social API {endpoint} returned invalid JSON"),
        source: Some(Box::new(e)),
    })
}
