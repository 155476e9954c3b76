// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the classification service contract.

use querydesk_core::{ChannelType, Priority, Sentiment};
use serde::{Deserialize, Serialize};

/// Request body for `POST /analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subject: None,
            sender_email: None,
            sender_id: None,
            channel_type: None,
        }
    }

    pub fn subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    pub fn sender_email(mut self, email: Option<String>) -> Self {
        self.sender_email = email;
        self
    }

    pub fn sender_id(mut self, id: Option<String>) -> Self {
        self.sender_id = id;
        self
    }

    pub fn channel_type(mut self, channel_type: ChannelType) -> Self {
        self.channel_type = Some(channel_type.to_string());
        self
    }
}

/// Response body for `POST /analyze`, and the per-item shape of the batch
/// endpoint.
///
/// Every field is defaulted so a partially populated response still
/// deserializes; the service's extra diagnostic maps (category_scores,
/// urgency_keywords) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Classification {
    pub category: String,
    pub category_confidence: f64,
    pub sentiment: Sentiment,
    pub sentiment_confidence: f64,
    pub intent: String,
    pub priority: Priority,
    pub priority_score: f64,
    pub is_urgent: bool,
    pub is_vip: bool,
    pub auto_tags: Vec<String>,
    pub keywords: Vec<String>,
    /// True when this value came from the neutral fallback rather than the
    /// service. Never on the wire.
    #[serde(skip)]
    pub degraded: bool,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            category: "question".to_string(),
            category_confidence: 0.0,
            sentiment: Sentiment::Neutral,
            sentiment_confidence: 0.0,
            intent: "unknown".to_string(),
            priority: Priority::Medium,
            priority_score: 0.5,
            is_urgent: false,
            is_vip: false,
            auto_tags: Vec::new(),
            keywords: Vec::new(),
            degraded: false,
        }
    }
}

impl Classification {
    /// The deterministic neutral value returned whenever the service is
    /// slow, down, or unparsable.
    pub fn fallback() -> Self {
        Self {
            degraded: true,
            ..Self::default()
        }
    }
}

/// Response body for `POST /analyze/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<Classification>,
    #[serde(default)]
    pub count: usize,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
}
