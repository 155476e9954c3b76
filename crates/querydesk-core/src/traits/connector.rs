// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability interface every channel connector implements.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DeskError;
use crate::types::{Attachment, ChannelType, ConnectionTest, ConnectorStatus, QueryResponse};

/// Runtime adapter for one external channel.
///
/// The supervisor is the only component allowed to drive this lifecycle;
/// connectors are registered as trait objects, never as concrete types.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The channel this connector serves.
    fn channel_id(&self) -> Uuid;

    fn channel_type(&self) -> ChannelType;

    /// Validates required configuration keys and prepares the session
    /// handle without consuming events. Idempotent: calling twice
    /// re-validates but must not leak a second session.
    ///
    /// Missing keys fail with [`DeskError::Config`] naming each one.
    async fn initialize(&mut self) -> Result<(), DeskError>;

    /// Performs an initial synchronous ingestion pass, then arranges
    /// recurring ingestion (polling or subscription).
    ///
    /// Calling `start` on a running connector logs a warning and returns
    /// `Ok` -- supervisor races must not surface as errors, and must not
    /// spawn a second polling loop.
    async fn start(&mut self) -> Result<(), DeskError>;

    /// Cancels the recurring poll/subscription and releases the session.
    ///
    /// Safe to call before `start` and safe to call twice. An in-flight
    /// pass may finish its current cycle but never schedules another.
    async fn stop(&mut self) -> Result<(), DeskError>;

    /// Lightweight authenticated probe ("who am I") without starting
    /// ingestion. Never errors; failures come back as a result value.
    async fn test_connection(&self) -> ConnectionTest;

    /// Delivers a reply to the conversation behind `query_id`, resolving
    /// the target from the query's protocol metadata, and persists the
    /// resulting non-internal response.
    ///
    /// Fails with [`DeskError::Send`] when the query belongs to another
    /// channel or the protocol call fails, and with
    /// [`DeskError::NotSupported`] on channel types that cannot send.
    async fn send_reply(
        &self,
        query_id: Uuid,
        user_id: Uuid,
        content: &str,
        attachments: &[Attachment],
    ) -> Result<QueryResponse, DeskError>;

    /// Snapshot of runtime state for status reporting. Must never expose
    /// configuration values.
    fn status(&self) -> ConnectorStatus;
}
