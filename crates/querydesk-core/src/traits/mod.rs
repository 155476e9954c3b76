// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for Querydesk connectors.

pub mod connector;
pub mod factory;

pub use connector::Connector;
pub use factory::ConnectorFactory;
