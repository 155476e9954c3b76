// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query lifecycle management.
//!
//! One entry point, [`QueryLifecycle`], through which every query is
//! created and mutated. Guarantees at-most-once ingestion per
//! (channel, external key), triages priority and SLA deadlines, and
//! enforces the forward status flow for automatic transitions.

pub mod manager;

pub use manager::{QueryLifecycle, QueryUpdate};
