// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority and SLA rules for incoming queries.
//!
//! Pure functions, no I/O. The lifecycle manager feeds classification
//! output and heuristic signals in here and persists the result.

pub mod priority;
pub mod sla;

pub use priority::{PriorityDecision, contains_urgency_keyword, is_urgent, resolve_priority};
pub use sla::{sla_due, sla_hours};
