// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority resolution.
//!
//! Signals are applied in strict precedence order. An explicit caller
//! priority always wins; VIP senders, negative sentiment, and urgency
//! keywords each force HIGH; a non-degraded classifier verdict is
//! honored next; everything else lands at MEDIUM.

use querydesk_core::{Priority, Sentiment};

/// Keywords that escalate a message to HIGH priority when found in its
/// content (case-insensitive substring match).
pub const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "critical",
    "emergency",
    "asap",
    "immediately",
    "broken",
    "down",
    "not working",
    "crisis",
];

/// A resolved priority with the signal that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityDecision {
    pub priority: Priority,
    /// Which rule fired, for logging.
    pub reason: &'static str,
}

/// Resolve the effective priority of an incoming message.
///
/// `classifier_priority` should be `None` when classification was skipped
/// or degraded to the neutral fallback; a degraded MEDIUM must not mask
/// the heuristic signals below it.
pub fn resolve_priority(
    explicit: Option<Priority>,
    is_vip: bool,
    sentiment: Sentiment,
    content: &str,
    classifier_priority: Option<Priority>,
) -> PriorityDecision {
    if let Some(priority) = explicit {
        return PriorityDecision {
            priority,
            reason: "explicit",
        };
    }
    if is_vip {
        return PriorityDecision {
            priority: Priority::High,
            reason: "vip_sender",
        };
    }
    if sentiment == Sentiment::Negative {
        return PriorityDecision {
            priority: Priority::High,
            reason: "negative_sentiment",
        };
    }
    if contains_urgency_keyword(content) {
        return PriorityDecision {
            priority: Priority::High,
            reason: "urgency_keyword",
        };
    }
    if let Some(priority) = classifier_priority {
        return PriorityDecision {
            priority,
            reason: "classifier",
        };
    }
    PriorityDecision {
        priority: Priority::Medium,
        reason: "default",
    }
}

/// True when any urgency keyword appears in `content`.
pub fn contains_urgency_keyword(content: &str) -> bool {
    let lowered = content.to_lowercase();
    URGENCY_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Effective urgency flag: HIGH or CRITICAL priority, or the classifier
/// said so.
pub fn is_urgent(priority: Priority, classifier_urgent: bool) -> bool {
    classifier_urgent || matches!(priority, Priority::Critical | Priority::High)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_beats_everything() {
        let d = resolve_priority(
            Some(Priority::Low),
            true,
            Sentiment::Negative,
            "URGENT: everything is broken",
            Some(Priority::Critical),
        );
        assert_eq!(d.priority, Priority::Low);
        assert_eq!(d.reason, "explicit");
    }

    #[test]
    fn vip_forces_high() {
        let d = resolve_priority(None, true, Sentiment::Positive, "thanks, all good", None);
        assert_eq!(d.priority, Priority::High);
        assert_eq!(d.reason, "vip_sender");
    }

    #[test]
    fn negative_sentiment_forces_high() {
        let d = resolve_priority(None, false, Sentiment::Negative, "this is disappointing", None);
        assert_eq!(d.priority, Priority::High);
        assert_eq!(d.reason, "negative_sentiment");
    }

    #[test]
    fn urgency_keyword_forces_high() {
        let d = resolve_priority(None, false, Sentiment::Neutral, "please fix ASAP", None);
        assert_eq!(d.priority, Priority::High);
        assert_eq!(d.reason, "urgency_keyword");
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(contains_urgency_keyword("The site is DOWN"));
        assert!(contains_urgency_keyword("it's Not Working at all"));
        assert!(!contains_urgency_keyword("everything looks fine"));
    }

    #[test]
    fn classifier_priority_honored_without_stronger_signals() {
        let d = resolve_priority(
            None,
            false,
            Sentiment::Neutral,
            "how do I export my data?",
            Some(Priority::Low),
        );
        assert_eq!(d.priority, Priority::Low);
        assert_eq!(d.reason, "classifier");
    }

    #[test]
    fn no_signals_default_to_medium() {
        let d = resolve_priority(None, false, Sentiment::Neutral, "hello there", None);
        assert_eq!(d.priority, Priority::Medium);
        assert_eq!(d.reason, "default");
    }

    #[test]
    fn keyword_beats_absent_classifier() {
        // A degraded classification passes None, so the keyword scan
        // still escalates.
        let d = resolve_priority(None, false, Sentiment::Neutral, "server is down", None);
        assert_eq!(d.priority, Priority::High);
    }

    #[test]
    fn urgency_flag_tracks_priority_and_classifier() {
        assert!(is_urgent(Priority::Critical, false));
        assert!(is_urgent(Priority::High, false));
        assert!(is_urgent(Priority::Low, true));
        assert!(!is_urgent(Priority::Medium, false));
        assert!(!is_urgent(Priority::Low, false));
    }
}
