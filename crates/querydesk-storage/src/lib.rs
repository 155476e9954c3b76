// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Querydesk ingestion engine.
//!
//! WAL-mode SQLite with embedded migrations, a single-writer concurrency
//! model via `tokio-rusqlite`, and typed CRUD for channels, queries,
//! assignments, and responses. The UNIQUE index on
//! `queries(channel_id, external_key)` backs the at-most-once ingestion
//! guarantee.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

mod codec;

pub use database::Database;
pub use queries::queries::QueryPatch;
pub use store::Storage;
