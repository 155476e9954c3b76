// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Querydesk ingestion engine.

use thiserror::Error;

use crate::types::ChannelType;

/// The primary error type used across all Querydesk crates.
///
/// Classifier unavailability is deliberately absent: the classification
/// gateway absorbs every transport failure into a neutral fallback value
/// and never surfaces an error to ingestion.
#[derive(Debug, Error)]
pub enum DeskError {
    /// Channel configuration errors (missing required keys, unparsable values).
    /// Fatal to that channel's start, never to the process.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient external-API failure. Retried at the next scheduled poll,
    /// never immediately.
    #[error("connection error: {message}")]
    Connection {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No connector implementation exists for the channel, or the channel
    /// is administratively inactive.
    #[error("unsupported channel: {0}")]
    UnsupportedChannel(String),

    /// The (query, user) pair already has an assignment.
    #[error("user {user_id} is already assigned to query {query_id}")]
    DuplicateAssignment {
        query_id: uuid::Uuid,
        user_id: uuid::Uuid,
    },

    /// Unknown query/channel/user id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// An outbound reply could not be delivered.
    #[error("send failed: {message}")]
    Send {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The channel type cannot deliver outbound replies at all.
    #[error("sending replies is not supported on {channel_type} channels")]
    NotSupported { channel_type: ChannelType },

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// Shorthand for a `Config` error naming the configuration keys a
    /// channel is missing.
    pub fn missing_keys(channel_type: ChannelType, missing: &[&str]) -> Self {
        DeskError::Config(format!(
            "{channel_type} channel is missing required configuration keys: [{}]",
            missing.join(", ")
        ))
    }
}
