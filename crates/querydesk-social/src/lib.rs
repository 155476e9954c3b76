// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Social channel: mentions polling plus webhook push ingestion, with
//! public threaded replies.

pub mod api;
pub mod config;
pub mod connector;

pub use api::{SocialApi, SocialPost};
pub use config::SocialConfig;
pub use connector::SocialConnector;
