// Moderation domain models - data structures for the moderation policy.
//
// These are pure domain types with no platform dependencies.
// The Discord and Telegram layers convert these to platform-specific actions.

use serde::Deserialize;
use thiserror::Error;

/// Why a sender was warned or escalated. Carried on the verdict so each
/// adapter can pick the platform-appropriate action (ban, kick, mute, remove).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Message matched the profanity word list
    Profanity,
    /// Identical message repeated past the spam limit
    Spam,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::Profanity => write!(f, "profanity"),
            ViolationKind::Spam => write!(f, "spam"),
        }
    }
}

/// The outcome of evaluating one message against the moderation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Message is fine - it has been recorded for later summarization
    Pass,
    /// Sender crossed a warning threshold but not the escalation limit
    Warn {
        kind: ViolationKind,
        /// How many more warnings the sender gets before escalation
        warnings_left: u32,
        /// Current violation count, for "Warning n/limit" notices
        count: u32,
    },
    /// Sender exceeded the configured limit - the adapter should take
    /// an administrative action (ban/kick/mute)
    Escalate { kind: ViolationKind },
}

/// Result of recording a message with the spam tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpamCheck {
    /// Whether the repeat count reached the configured limit
    pub is_spam: bool,
    /// How many consecutive times this exact message has been seen
    /// within the spam window (1 = first occurrence)
    pub repeat_count: u32,
}

/// The most recent message seen from a sender.
#[derive(Debug, Clone)]
pub struct LastMessage {
    pub text: String,
    pub timestamp_ms: i64,
    pub repeat_count: u32,
}

/// Configuration for the moderation policy.
///
/// One instance per platform adapter - never a process-wide singleton.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Profanity violations allowed before escalation
    pub profanity_limit: u32,
    /// Identical repeats that trigger a spam escalation
    pub spam_limit: u32,
    /// Time window for counting repeated messages (milliseconds)
    pub spam_window_ms: i64,
    /// How many passed messages to keep for summarization
    pub max_messages: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            profanity_limit: 3,     // 3 warnings before removal
            spam_limit: 5,          // 5 identical messages...
            spam_window_ms: 60_000, // ...within 1 minute
            max_messages: 15,       // ring buffer for /summary
        }
    }
}

impl ModerationConfig {
    /// Read the config from environment variables, falling back to the
    /// defaults above for anything unset or unparsable.
    pub fn from_env() -> Self {
        fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            profanity_limit: env_parse("PROFANITY_LIMIT", defaults.profanity_limit),
            spam_limit: env_parse("SPAM_LIMIT", defaults.spam_limit),
            spam_window_ms: env_parse("SPAM_TIME_WINDOW", defaults.spam_window_ms),
            max_messages: env_parse("MAX_MESSAGES", defaults.max_messages),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("failed to read profanity list at {path}: {source}")]
    ListUnreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse profanity list at {path}: {source}")]
    ListMalformed {
        path: String,
        source: serde_json::Error,
    },
}
