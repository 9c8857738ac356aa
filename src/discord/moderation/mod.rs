// Discord moderation adapter - commands and the message handler that
// applies policy verdicts.

pub mod commands;
pub mod message_handler;
