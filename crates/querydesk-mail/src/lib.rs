// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail channel: IMAP ingestion and SMTP replies.
//!
//! The connector polls for unseen messages, normalizes them via
//! `mail-parser`, and creates queries through the lifecycle manager.
//! Message-ID keys deduplication; replies thread with In-Reply-To.

pub mod config;
pub mod connector;
pub mod gateway;
pub mod parse;

pub use config::MailConfig;
pub use connector::MailConnector;
pub use gateway::{ImapSmtpGateway, MailGateway, OutgoingMail, RawMail};
