// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector supervision.
//!
//! The [`Supervisor`] is the single owner of live connectors: it starts,
//! stops, reloads, and probes them, and reports their runtime status. All
//! connector construction is delegated to an injected factory.

pub mod supervisor;

pub use supervisor::Supervisor;
