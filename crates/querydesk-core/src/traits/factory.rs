// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construction of connectors from persisted channel records.

use crate::error::DeskError;
use crate::traits::Connector;
use crate::types::Channel;

/// Builds a fresh, uninitialized connector for a channel record.
///
/// The supervisor never constructs connectors directly; injecting a
/// factory keeps the registry testable and keeps protocol crates out of
/// the supervisor's dependency graph. Implementations must reject channel
/// types they have no adapter for with [`DeskError::UnsupportedChannel`].
pub trait ConnectorFactory: Send + Sync {
    fn build(&self, channel: &Channel) -> Result<Box<dyn Connector>, DeskError>;
}
