// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat channel: bot-API update polling with in-thread replies.
//!
//! Dedup key is `{chat_id}:{message_id}`; the update offset cursor
//! additionally confirms consumed updates server-side.

pub mod api;
pub mod config;
pub mod connector;

pub use api::ChatApi;
pub use config::ChatConfig;
pub use connector::ChatConnector;
