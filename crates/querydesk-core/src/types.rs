// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Querydesk workspace.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// External source kinds the engine knows about.
///
/// `Sms` has no connector implementation; starting an SMS channel yields
/// [`crate::DeskError::UnsupportedChannel`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    Mail,
    Chat,
    Social,
    Sms,
}

/// Sentiment of a query as reported by the classification service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Priority level of a query, in descending order of urgency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

/// Lifecycle states of a query.
///
/// Automatic transitions move strictly forward (NEW -> ASSIGNED ->
/// IN_PROGRESS -> RESOLVED -> CLOSED); administrative overrides may set
/// any state directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    New,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

/// Persisted identity and configuration of an external source.
///
/// Created and edited by the administrative CRUD layer; strictly read-only
/// to the engine. Runtime state (connected, last poll) lives in
/// [`RuntimeState`](crate::runtime::RuntimeState), never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    pub channel_type: ChannelType,
    pub active: bool,
    /// Opaque type-specific settings (credentials, hosts, tokens). Status
    /// reporting exposes key names only, never values.
    pub config: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// An attachment carried by a query or an outbound reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A normalized inbound event produced by a connector.
///
/// Ephemeral: exists only between protocol decode and query creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub content: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Channel-specific sender identifier (email address, user id, handle).
    pub sender_address: String,
    /// Dedup key unique within the channel (provider message id).
    pub external_key: String,
    /// Conversation key for reply correlation.
    #[serde(default)]
    pub thread_key: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Protocol-specific extras needed later to send a reply (chat id,
    /// parent status id, reply-to address).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// The canonical, persisted unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub id: Uuid,
    /// Owning channel; immutable after creation.
    pub channel_id: Uuid,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub content: String,
    pub sender_name: Option<String>,
    pub sender_address: String,
    pub sentiment: Sentiment,
    pub intent: Option<String>,
    pub confidence: f64,
    pub auto_tags: Vec<String>,
    pub priority: Priority,
    pub status: QueryStatus,
    pub is_vip: bool,
    pub is_urgent: bool,
    /// At most one query exists per (channel_id, external_key).
    pub external_key: String,
    pub thread_key: Option<String>,
    pub attachments: Vec<Attachment>,
    pub metadata: HashMap<String, String>,
    /// Immutable, stamped at creation.
    pub received_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Recomputed whenever priority changes.
    pub sla_due_at: DateTime<Utc>,
}

/// Links a query to a responsible agent. A query may carry several
/// concurrent assignments, but never two for the same user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub query_id: Uuid,
    pub user_id: Uuid,
    pub assigned_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An outbound reply or internal note tied to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub id: Uuid,
    pub query_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_internal: bool,
    pub sent_at: DateTime<Utc>,
}

/// A query creation request: a normalized event plus optional explicit
/// overrides, which always win over classifier output.
#[derive(Debug, Clone)]
pub struct NewQuery {
    pub channel_id: Uuid,
    pub event: InboundEvent,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub is_vip: Option<bool>,
    /// Skip the classification call entirely (administrative imports).
    pub skip_classification: bool,
}

impl NewQuery {
    /// Wraps a connector event with no overrides.
    pub fn from_event(channel_id: Uuid, event: InboundEvent) -> Self {
        Self {
            channel_id,
            event,
            priority: None,
            category: None,
            is_vip: None,
            skip_classification: false,
        }
    }
}

/// Outcome of a lightweight authenticated probe. Always a value, never an
/// error: connectors must not throw from `test_connection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTest {
    pub ok: bool,
    pub message: String,
}

impl ConnectionTest {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Snapshot of one connector's runtime state for status reporting.
///
/// Carries configuration key names only; secret values never leave storage.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorStatus {
    pub channel_id: Uuid,
    pub channel_type: ChannelType,
    pub running: bool,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub config_keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn channel_type_screaming_snake_round_trip() {
        for ct in [
            ChannelType::Mail,
            ChannelType::Chat,
            ChannelType::Social,
            ChannelType::Sms,
        ] {
            let s = ct.to_string();
            assert_eq!(s, s.to_uppercase());
            assert_eq!(ChannelType::from_str(&s).unwrap(), ct);
        }
    }

    #[test]
    fn query_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&QueryStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: QueryStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, QueryStatus::InProgress);
    }

    #[test]
    fn sentiment_defaults_to_neutral() {
        assert_eq!(Sentiment::default(), Sentiment::Neutral);
    }

    #[test]
    fn new_query_from_event_has_no_overrides() {
        let event = InboundEvent {
            content: "hello".into(),
            subject: None,
            sender_name: None,
            sender_address: "a@example.com".into(),
            external_key: "k1".into(),
            thread_key: None,
            attachments: Vec::new(),
            metadata: HashMap::new(),
        };
        let new = NewQuery::from_event(Uuid::new_v4(), event);
        assert!(new.priority.is_none());
        assert!(new.category.is_none());
        assert!(new.is_vip.is_none());
        assert!(!new.skip_classification);
    }
}
