// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Querydesk multi-channel ingestion engine.
//!
//! Provides the error taxonomy, the canonical domain types (channels,
//! queries, assignments, responses), the connector runtime state, and the
//! [`Connector`] capability trait implemented by every channel adapter.

pub mod error;
pub mod poll;
pub mod runtime;
pub mod traits;
pub mod types;

pub use error::DeskError;
pub use poll::PollTask;
pub use runtime::RuntimeState;
pub use traits::{Connector, ConnectorFactory};
pub use types::{
    Assignment, Attachment, Channel, ChannelType, ConnectionTest, ConnectorStatus, InboundEvent,
    NewQuery, Priority, Query, QueryResponse, QueryStatus, Sentiment,
};
