// Core moderation module - profanity matching, spam tracking, and the
// policy that composes them.

pub mod moderation_models;
pub mod moderation_policy;
pub mod profanity;
pub mod spam_tracker;

pub use moderation_models::*;
pub use moderation_policy::ModerationPolicy;
pub use profanity::ProfanityList;
pub use spam_tracker::SpamTracker;
