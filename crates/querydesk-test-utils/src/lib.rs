// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles and fixtures.
//!
//! Not part of the shipped engine; depended on only from dev-dependency
//! tables.

pub mod fixtures;
pub mod mock_connector;

pub use fixtures::{sample_event, seed_channel, temp_storage};
pub use mock_connector::{MockConnector, MockFactory, MockHandle};
