// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SLA deadline computation.

use chrono::{DateTime, Duration, Utc};
use querydesk_core::Priority;

/// Response window in hours for each priority tier.
pub fn sla_hours(priority: Priority) -> i64 {
    match priority {
        Priority::Critical => 1,
        Priority::High => 4,
        Priority::Medium => 24,
        Priority::Low => 72,
    }
}

/// Deadline for a query of `priority` received (or re-prioritized) at
/// `base`. Re-prioritization recomputes from the moment of change, not
/// from the original arrival.
pub fn sla_due(priority: Priority, base: DateTime<Utc>) -> DateTime<Utc> {
    base + Duration::hours(sla_hours(priority))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn hours_per_tier() {
        assert_eq!(sla_hours(Priority::Critical), 1);
        assert_eq!(sla_hours(Priority::High), 4);
        assert_eq!(sla_hours(Priority::Medium), 24);
        assert_eq!(sla_hours(Priority::Low), 72);
    }

    #[test]
    fn deadline_offsets_from_base() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            sla_due(Priority::High, base),
            Utc.with_ymd_and_hms(2026, 3, 1, 16, 0, 0).unwrap()
        );
        assert_eq!(
            sla_due(Priority::Low, base),
            Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
        );
    }
}
