// Spam tracking - per-sender repeated-message detection.
//
// Tracks the most recent message from each sender and how many consecutive
// times it has repeated within the configured time window. Pure bookkeeping,
// no platform dependencies; the caller supplies the clock so tests are
// deterministic.

use super::moderation_models::{LastMessage, SpamCheck};
use dashmap::DashMap;

/// Tracks each sender's most recent message and a rolling repeat counter.
///
/// State lives in memory for the lifetime of the bot process and is owned
/// by exactly one `ModerationPolicy` instance - never shared across
/// platforms. `DashMap` keeps concurrent event handlers from losing
/// counter updates.
#[derive(Debug, Default)]
pub struct SpamTracker {
    last_messages: DashMap<String, LastMessage>,
}

impl SpamTracker {
    pub fn new() -> Self {
        Self {
            last_messages: DashMap::new(),
        }
    }

    /// Record a message and report whether it crossed the spam limit.
    ///
    /// Semantics:
    /// - first message from a sender starts the counter at 1;
    /// - the same text within `window_ms` increments it (and refreshes the
    ///   stored timestamp, so the window slides with each repeat);
    /// - a different text, or a gap of `window_ms` or more, resets to 1.
    ///
    /// Elapsed time is clamped to zero before the window comparison, so a
    /// wall-clock regression counts as "no time passed" instead of forcing
    /// a spurious reset.
    ///
    /// After the limit fires the stored counter goes back to 1: the sender
    /// was (or is about to be) acted on, and without the reset every
    /// following message would escalate again.
    pub fn record_and_check(
        &self,
        sender_id: &str,
        message: &str,
        now_ms: i64,
        window_ms: i64,
        limit: u32,
    ) -> SpamCheck {
        let mut entry = self
            .last_messages
            .entry(sender_id.to_string())
            .or_insert_with(|| LastMessage {
                text: message.to_string(),
                timestamp_ms: now_ms,
                repeat_count: 0,
            });

        let elapsed = (now_ms - entry.timestamp_ms).max(0);
        let is_repeat = entry.repeat_count > 0 && entry.text == message && elapsed < window_ms;

        let repeat_count = if is_repeat {
            entry.repeat_count + 1
        } else {
            1
        };
        let is_spam = repeat_count >= limit;

        entry.text = message.to_string();
        entry.timestamp_ms = now_ms;
        entry.repeat_count = if is_spam { 1 } else { repeat_count };

        SpamCheck {
            is_spam,
            repeat_count,
        }
    }

    /// Remove entries whose last activity is older than `max_idle_ms`.
    ///
    /// Sender state is otherwise never reclaimed, which is unbounded
    /// growth for a long-running process. Returns how many entries were
    /// dropped.
    pub fn prune_idle(&self, now_ms: i64, max_idle_ms: i64) -> usize {
        let before = self.last_messages.len();
        self.last_messages
            .retain(|_, last| (now_ms - last.timestamp_ms).max(0) < max_idle_ms);
        before - self.last_messages.len()
    }

    #[cfg(test)]
    pub(crate) fn tracked_senders(&self) -> usize {
        self.last_messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: i64 = 60_000;
    const LIMIT: u32 = 5;

    #[test]
    fn first_message_is_never_spam() {
        let tracker = SpamTracker::new();
        let check = tracker.record_and_check("user-1", "hi", 0, WINDOW, LIMIT);
        assert_eq!(
            check,
            SpamCheck {
                is_spam: false,
                repeat_count: 1
            }
        );
    }

    #[test]
    fn fifth_identical_message_within_window_is_spam() {
        let tracker = SpamTracker::new();
        for i in 0..4 {
            let check = tracker.record_and_check("user-1", "buy now", i * 1000, WINDOW, LIMIT);
            assert!(!check.is_spam, "repeat {} should not be spam", i + 1);
            assert_eq!(check.repeat_count, i as u32 + 1);
        }

        let check = tracker.record_and_check("user-1", "buy now", 5_000, WINDOW, LIMIT);
        assert!(check.is_spam);
        assert_eq!(check.repeat_count, 5);
    }

    #[test]
    fn different_message_resets_counter() {
        let tracker = SpamTracker::new();
        tracker.record_and_check("user-1", "hello", 0, WINDOW, LIMIT);
        tracker.record_and_check("user-1", "hello", 1_000, WINDOW, LIMIT);

        let check = tracker.record_and_check("user-1", "something else", 2_000, WINDOW, LIMIT);
        assert_eq!(check.repeat_count, 1);
        assert!(!check.is_spam);
    }

    #[test]
    fn gap_beyond_window_resets_counter() {
        let tracker = SpamTracker::new();
        tracker.record_and_check("user-1", "hello", 0, WINDOW, LIMIT);

        let check = tracker.record_and_check("user-1", "hello", WINDOW + 1, WINDOW, LIMIT);
        assert_eq!(check.repeat_count, 1);
    }

    #[test]
    fn window_slides_with_each_repeat() {
        // Repeats 40s apart each stay inside the 60s window because the
        // stored timestamp refreshes on every repeat.
        let tracker = SpamTracker::new();
        let mut now = 0;
        for expected in 1..=4u32 {
            let check = tracker.record_and_check("user-1", "hello", now, WINDOW, LIMIT);
            assert_eq!(check.repeat_count, expected);
            now += 40_000;
        }
    }

    #[test]
    fn clock_regression_does_not_reset() {
        let tracker = SpamTracker::new();
        tracker.record_and_check("user-1", "hello", 10_000, WINDOW, LIMIT);

        // Clock went backwards; elapsed clamps to zero, still a repeat.
        let check = tracker.record_and_check("user-1", "hello", 5_000, WINDOW, LIMIT);
        assert_eq!(check.repeat_count, 2);
    }

    #[test]
    fn counter_resets_after_limit_fires() {
        let tracker = SpamTracker::new();
        for _ in 0..5 {
            tracker.record_and_check("user-1", "spam", 0, WINDOW, LIMIT);
        }

        // The escalation consumed the streak; the next repeat starts over.
        let check = tracker.record_and_check("user-1", "spam", 0, WINDOW, LIMIT);
        assert_eq!(check.repeat_count, 2);
        assert!(!check.is_spam);
    }

    #[test]
    fn senders_are_tracked_independently() {
        let tracker = SpamTracker::new();
        tracker.record_and_check("user-1", "hello", 0, WINDOW, LIMIT);
        let check = tracker.record_and_check("user-2", "hello", 0, WINDOW, LIMIT);
        assert_eq!(check.repeat_count, 1);
    }

    #[test]
    fn prune_drops_only_idle_entries() {
        let tracker = SpamTracker::new();
        tracker.record_and_check("old", "hello", 0, WINDOW, LIMIT);
        tracker.record_and_check("fresh", "hello", 90_000, WINDOW, LIMIT);

        let dropped = tracker.prune_idle(100_000, 60_000);
        assert_eq!(dropped, 1);
        assert_eq!(tracker.tracked_senders(), 1);

        // The pruned sender starts from scratch.
        let check = tracker.record_and_check("old", "hello", 100_000, WINDOW, LIMIT);
        assert_eq!(check.repeat_count, 1);
    }
}
