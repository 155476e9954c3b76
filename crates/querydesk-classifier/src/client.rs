// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the classification service.
//!
//! Classification is advisory: the ingestion pipeline must keep moving
//! when the service is slow, down, or returns garbage. `analyze` and
//! `analyze_batch` are therefore infallible and substitute the neutral
//! fallback on any failure, logging a warning instead of propagating.

use std::time::Duration;

use querydesk_core::{ConnectionTest, DeskError};
use querydesk_config::ClassifierConfig;
use tracing::{debug, warn};

use crate::types::{AnalyzeRequest, BatchResponse, Classification, HealthResponse};

/// Client for the external classification service.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClassifierClient {
    /// Build a client from configuration. The request timeout applies to
    /// the whole round trip, connect included.
    pub fn new(config: &ClassifierConfig) -> Result<Self, DeskError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeskError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Classify one message. Never fails; degraded results carry the
    /// neutral fallback values.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Classification {
        let url = format!("{}/analyze", self.base_url);
        match self.post_json::<_, Classification>(&url, request).await {
            Ok(classification) => {
                debug!(
                    category = %classification.category,
                    priority = %classification.priority,
                    "message classified"
                );
                classification
            }
            Err(reason) => {
                warn!(%reason, "classification unavailable, using neutral fallback");
                Classification::fallback()
            }
        }
    }

    /// Classify a batch of messages, preserving order. On total failure
    /// every slot gets the fallback; a short response is padded with
    /// fallbacks so the output length always matches the input.
    pub async fn analyze_batch(&self, requests: &[AnalyzeRequest]) -> Vec<Classification> {
        if requests.is_empty() {
            return Vec::new();
        }
        let url = format!("{}/analyze/batch", self.base_url);
        let mut results = match self.post_json::<_, BatchResponse>(&url, &requests).await {
            Ok(batch) => batch.results,
            Err(reason) => {
                warn!(%reason, count = requests.len(), "batch classification unavailable");
                Vec::new()
            }
        };
        if results.len() != requests.len() {
            if !results.is_empty() {
                warn!(
                    expected = requests.len(),
                    got = results.len(),
                    "batch result count mismatch, padding with fallback"
                );
            }
            results.truncate(requests.len());
            results.resize_with(requests.len(), Classification::fallback);
        }
        results
    }

    /// Probe the service's health endpoint.
    pub async fn health(&self) -> ConnectionTest {
        let url = format!("{}/health", self.base_url);
        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return ConnectionTest::failed(format!("classifier unreachable: {e}")),
        };
        if !response.status().is_success() {
            return ConnectionTest::failed(format!(
                "classifier health check returned {}",
                response.status()
            ));
        }
        match response.json::<HealthResponse>().await {
            Ok(health) => ConnectionTest::ok(format!("classifier {}", health.status)),
            Err(e) => ConnectionTest::failed(format!("invalid health response: {e}")),
        }
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, String>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("service returned {status}"));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| format!("invalid response body: {e}"))
    }
}
