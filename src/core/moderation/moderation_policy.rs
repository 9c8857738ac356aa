// Moderation policy - core business logic for message moderation.
//
// Composes the profanity matcher and the spam tracker into a single
// decision: Pass, Warn, or Escalate. The policy owns all per-sender state
// for one platform adapter and mutates it synchronously; what a verdict
// means in platform terms (delete/ban/kick/mute) is the adapter's problem.
//
// NO Discord or Telegram dependencies here - just pure domain logic.

use super::moderation_models::{ModerationConfig, Verdict, ViolationKind};
use super::profanity::ProfanityList;
use super::spam_tracker::SpamTracker;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Moderation decision policy for one platform instance.
///
/// Construct one per adapter with injected configuration. All state is
/// in-memory and resets on restart.
pub struct ModerationPolicy {
    config: ModerationConfig,
    profanity: ProfanityList,
    spam: SpamTracker,
    /// Cumulative profanity violations per sender. Never reset except by
    /// an escalation or an explicit administrative clear.
    profanity_counts: DashMap<String, u32>,
    /// Bounded FIFO of recently passed messages, kept for summarization.
    recent_messages: Mutex<VecDeque<String>>,
}

impl ModerationPolicy {
    pub fn new(config: ModerationConfig, profanity: ProfanityList) -> Self {
        Self {
            config,
            profanity,
            spam: SpamTracker::new(),
            profanity_counts: DashMap::new(),
            recent_messages: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Evaluate one inbound message.
    ///
    /// `is_command` means the message starts with the platform's command
    /// prefix; commands are dispatched elsewhere and bypass moderation
    /// entirely (no counter is touched).
    ///
    /// `now_ms` is wall-clock milliseconds supplied by the caller, which
    /// keeps the policy deterministic under test.
    ///
    /// Profanity takes precedence: once it fires, the spam check is
    /// skipped for that message.
    pub fn evaluate(
        &self,
        sender_id: &str,
        message: &str,
        is_command: bool,
        now_ms: i64,
    ) -> Verdict {
        if is_command {
            return Verdict::Pass;
        }

        if self.profanity.contains_profanity(message) {
            return self.evaluate_profanity(sender_id);
        }

        let check = self.spam.record_and_check(
            sender_id,
            message,
            now_ms,
            self.config.spam_window_ms,
            self.config.spam_limit,
        );

        if check.is_spam {
            return Verdict::Escalate {
                kind: ViolationKind::Spam,
            };
        }

        // Warnings start after 2 repeats regardless of the configured
        // limit; groups have come to expect the "Warning 3/5" cadence.
        if check.repeat_count > 2 {
            return Verdict::Warn {
                kind: ViolationKind::Spam,
                warnings_left: self.config.spam_limit - check.repeat_count,
                count: check.repeat_count,
            };
        }

        self.remember(message);
        Verdict::Pass
    }

    fn evaluate_profanity(&self, sender_id: &str) -> Verdict {
        let count = {
            let mut entry = self
                .profanity_counts
                .entry(sender_id.to_string())
                .or_insert(0);
            *entry += 1;
            *entry
        };

        if count <= self.config.profanity_limit {
            Verdict::Warn {
                kind: ViolationKind::Profanity,
                warnings_left: self.config.profanity_limit - count + 1,
                count,
            }
        } else {
            // The sender is being removed; start over if they come back.
            self.profanity_counts.remove(sender_id);
            Verdict::Escalate {
                kind: ViolationKind::Profanity,
            }
        }
    }

    /// Current profanity warning count for a sender.
    pub fn warnings(&self, sender_id: &str) -> u32 {
        self.profanity_counts
            .get(sender_id)
            .map(|c| *c)
            .unwrap_or(0)
    }

    /// Administrative reset of a sender's profanity warnings.
    /// Returns the count that was cleared.
    pub fn clear_warnings(&self, sender_id: &str) -> u32 {
        self.profanity_counts
            .remove(sender_id)
            .map(|(_, count)| count)
            .unwrap_or(0)
    }

    /// Snapshot of the recent-message buffer, oldest first.
    pub fn recent_messages(&self) -> Vec<String> {
        self.recent_messages
            .lock()
            .expect("recent message buffer poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Drop spam-tracker state for senders idle longer than `max_idle_ms`.
    /// Returns how many entries were dropped.
    pub fn prune_idle(&self, now_ms: i64, max_idle_ms: i64) -> usize {
        self.spam.prune_idle(now_ms, max_idle_ms)
    }

    fn remember(&self, message: &str) {
        let mut buffer = self
            .recent_messages
            .lock()
            .expect("recent message buffer poisoned");
        buffer.push_back(message.to_string());
        while buffer.len() > self.config.max_messages {
            buffer.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ModerationPolicy {
        policy_with(ModerationConfig::default())
    }

    fn policy_with(config: ModerationConfig) -> ModerationPolicy {
        ModerationPolicy::new(config, ProfanityList::from_words(["damn", "crap"]))
    }

    #[test]
    fn clean_message_passes_and_is_remembered() {
        let policy = policy();
        let verdict = policy.evaluate("user-1", "hello there", false, 0);
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(policy.recent_messages(), vec!["hello there".to_string()]);
    }

    #[test]
    fn profanity_warns_then_escalates() {
        // profanity_limit = 3: counts 1..=3 warn, the 4th escalates.
        let policy = policy();

        let verdict = policy.evaluate("user-1", "damn", false, 0);
        assert_eq!(
            verdict,
            Verdict::Warn {
                kind: ViolationKind::Profanity,
                warnings_left: 3,
                count: 1,
            }
        );

        policy.evaluate("user-1", "damn", false, 1);
        let verdict = policy.evaluate("user-1", "damn", false, 2);
        assert_eq!(
            verdict,
            Verdict::Warn {
                kind: ViolationKind::Profanity,
                warnings_left: 1,
                count: 3,
            }
        );

        let verdict = policy.evaluate("user-1", "oh damn", false, 3);
        assert_eq!(
            verdict,
            Verdict::Escalate {
                kind: ViolationKind::Profanity,
            }
        );
    }

    #[test]
    fn profanity_count_resets_after_escalation() {
        let policy = policy();
        for i in 0..4 {
            policy.evaluate("user-1", "damn", false, i);
        }
        // Escalated and reset: the next violation warns again from scratch.
        assert_eq!(policy.warnings("user-1"), 0);
        let verdict = policy.evaluate("user-1", "damn", false, 10);
        assert_eq!(
            verdict,
            Verdict::Warn {
                kind: ViolationKind::Profanity,
                warnings_left: 3,
                count: 1,
            }
        );
    }

    #[test]
    fn profanity_takes_precedence_over_spam() {
        let policy = policy();
        // The same profane message repeated never reaches the spam
        // tracker, so no spam verdict can fire.
        for i in 0..3 {
            let verdict = policy.evaluate("user-1", "damn", false, i);
            assert!(matches!(
                verdict,
                Verdict::Warn {
                    kind: ViolationKind::Profanity,
                    ..
                }
            ));
        }
    }

    #[test]
    fn repeated_messages_warn_then_escalate() {
        // spam_limit = 5: repeats 3 and 4 warn, the 5th escalates.
        let policy = policy();

        assert_eq!(policy.evaluate("user-1", "hi", false, 0), Verdict::Pass);
        assert_eq!(policy.evaluate("user-1", "hi", false, 1_000), Verdict::Pass);

        let verdict = policy.evaluate("user-1", "hi", false, 2_000);
        assert_eq!(
            verdict,
            Verdict::Warn {
                kind: ViolationKind::Spam,
                warnings_left: 2,
                count: 3,
            }
        );

        let verdict = policy.evaluate("user-1", "hi", false, 3_000);
        assert_eq!(
            verdict,
            Verdict::Warn {
                kind: ViolationKind::Spam,
                warnings_left: 1,
                count: 4,
            }
        );

        let verdict = policy.evaluate("user-1", "hi", false, 4_000);
        assert_eq!(
            verdict,
            Verdict::Escalate {
                kind: ViolationKind::Spam,
            }
        );
    }

    #[test]
    fn spam_resets_when_window_expires() {
        let policy = policy();
        policy.evaluate("user-1", "hi", false, 0);
        policy.evaluate("user-1", "hi", false, 1_000);

        // More than a minute of silence; the streak starts over.
        let verdict = policy.evaluate("user-1", "hi", false, 120_000);
        assert_eq!(verdict, Verdict::Pass);
    }

    #[test]
    fn commands_bypass_all_counters() {
        let policy = policy();
        let verdict = policy.evaluate("user-1", "!bot damn damn damn", true, 0);
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(policy.warnings("user-1"), 0);

        // Commands are not summarization material either.
        assert!(policy.recent_messages().is_empty());

        // And repeating a command never builds a spam streak.
        for i in 0..10 {
            assert_eq!(policy.evaluate("user-1", "!test", true, i), Verdict::Pass);
        }
    }

    #[test]
    fn only_passed_messages_enter_the_buffer() {
        let policy = policy();
        policy.evaluate("user-1", "damn", false, 0); // warned, not stored
        policy.evaluate("user-2", "hello", false, 0); // passed, stored
        assert_eq!(policy.recent_messages(), vec!["hello".to_string()]);
    }

    #[test]
    fn recent_buffer_evicts_oldest_first() {
        let config = ModerationConfig {
            max_messages: 3,
            ..Default::default()
        };
        let policy = policy_with(config);

        for i in 0..5 {
            policy.evaluate(&format!("user-{i}"), &format!("message {i}"), false, 0);
        }

        assert_eq!(
            policy.recent_messages(),
            vec![
                "message 2".to_string(),
                "message 3".to_string(),
                "message 4".to_string(),
            ]
        );
    }

    #[test]
    fn clear_warnings_is_an_explicit_admin_reset() {
        let policy = policy();
        policy.evaluate("user-1", "damn", false, 0);
        policy.evaluate("user-1", "damn", false, 1);
        assert_eq!(policy.warnings("user-1"), 2);

        assert_eq!(policy.clear_warnings("user-1"), 2);
        assert_eq!(policy.warnings("user-1"), 0);

        // Clearing an unknown sender is a no-op.
        assert_eq!(policy.clear_warnings("nobody"), 0);
    }
}
