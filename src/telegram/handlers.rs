// Telegram adapter - command dispatch and moderation handling.
//
// Mirrors the Discord layer: extract primitives from the update, run the
// core policy, translate the verdict into Telegram actions (delete is not
// needed here; Telegram moderation is warn/mute/kick).

use crate::core::ai::{ChatService, CHAT_FALLBACK, SUMMARY_FALLBACK};
use crate::core::moderation::{ModerationPolicy, Verdict, ViolationKind};
use crate::infra::ai::GeminiClient;
use std::sync::Arc;
use teloxide::{
    payloads::RestrictChatMemberSetters,
    prelude::*,
    types::{ChatPermissions, Me},
    RequestError,
};

/// How long a spammer loses the ability to send messages.
const SPAM_MUTE_SECS: i64 = 3600;

/// Everything the Telegram handlers need, injected through dptree.
pub struct TelegramState {
    pub policy: Arc<ModerationPolicy>,
    pub ai: Arc<ChatService<GeminiClient>>,
}

/// Build and run the dispatcher. Returns when the bot shuts down.
pub async fn run(bot: Bot, state: Arc<TelegramState>) {
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message));

    tracing::info!("Telegram bot is running...");

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

pub async fn handle_message(
    bot: Bot,
    me: Me,
    message: Message,
    state: Arc<TelegramState>,
) -> Result<(), RequestError> {
    // Non-text updates (stickers, joins, ...) are not moderated
    let Some(text) = message.text() else {
        return Ok(());
    };

    if text.starts_with('/') {
        return dispatch_command(&bot, &me, &message, &state, text).await;
    }

    let Some(user) = message.from() else {
        return Ok(());
    };
    let sender_id = user.id.to_string();
    let now_ms = chrono::Utc::now().timestamp_millis();

    let verdict = state.policy.evaluate(&sender_id, text, false, now_ms);

    match verdict {
        Verdict::Pass => {}

        Verdict::Warn {
            kind: ViolationKind::Profanity,
            warnings_left,
            ..
        } => {
            bot.send_message(
                message.chat.id,
                format!(
                    "⚠️ Warning: Profanity is not allowed. You have {} warnings left.",
                    warnings_left
                ),
            )
            .await?;
        }

        Verdict::Warn {
            kind: ViolationKind::Spam,
            count,
            ..
        } => {
            bot.send_message(
                message.chat.id,
                format!(
                    "⚠️ Stop spamming! Warning {}/{}",
                    count,
                    state.policy.config().spam_limit
                ),
            )
            .await?;
        }

        Verdict::Escalate {
            kind: ViolationKind::Profanity,
        } => match bot.ban_chat_member(message.chat.id, user.id).await {
            Ok(_) => {
                bot.send_message(message.chat.id, "⚠️ User removed for excessive profanity.")
                    .await?;
            }
            Err(e) => {
                // Never retried; the bot may simply lack admin rights here
                tracing::error!("Failed to remove user {}: {}", user.id, e);
                bot.send_message(
                    message.chat.id,
                    "Failed to remove user. An admin has been notified.",
                )
                .await?;
            }
        },

        Verdict::Escalate {
            kind: ViolationKind::Spam,
        } => {
            let until = chrono::Utc::now() + chrono::Duration::seconds(SPAM_MUTE_SECS);
            match bot
                .restrict_chat_member(message.chat.id, user.id, ChatPermissions::empty())
                .until_date(until)
                .await
            {
                Ok(_) => {
                    bot.send_message(message.chat.id, "⚠️ User muted for spamming!")
                        .await?;
                }
                Err(e) => {
                    tracing::error!("Failed to mute user {}: {}", user.id, e);
                    bot.send_message(
                        message.chat.id,
                        "Failed to mute user. An admin has been notified.",
                    )
                    .await?;
                }
            }
        }
    }

    Ok(())
}

/// Static command dispatch. Unknown commands are ignored so the bot stays
/// quiet in groups where other bots share the slash namespace.
async fn dispatch_command(
    bot: &Bot,
    me: &Me,
    message: &Message,
    state: &TelegramState,
    text: &str,
) -> Result<(), RequestError> {
    let mut parts = text.splitn(2, char::is_whitespace);
    let command_word = parts.next().unwrap_or_default();
    let args = parts.next().unwrap_or("").trim();

    // Commands in groups may arrive as "/summary@our_bot_name"
    let username = format!("@{}", me.username());
    let command = command_word
        .trim_end_matches(username.as_str())
        .to_lowercase();

    match command.as_str() {
        "/start" => {
            bot.send_message(
                message.chat.id,
                "👋 Hello! I'm Dia, your friendly Telegram bot. Use /functions to see what I can do!",
            )
            .await?;
        }

        "/functions" => {
            bot.send_message(
                message.chat.id,
                "🤖 Available Bot Commands 🤖\n\n\
                 1️⃣ /bot [message] - Chat with me! Example: /bot How are you?\n\
                 2️⃣ /rules - Display group rules\n\
                 3️⃣ /summary - Get a summary of recent messages\n\
                 4️⃣ /test - Check if bot is working\n\
                 5️⃣ /start - Get a friendly greeting\n\
                 6️⃣ /functions - Display this help message\n\n\
                 ✨ Feel free to use any of these commands! I'm here to help! ✨",
            )
            .await?;
        }

        "/rules" => {
            bot.send_message(
                message.chat.id,
                format!(
                    "📜 GROUP RULES 📜\n\n\
                     1️⃣ No Profanity ❌\n\
                     2️⃣ Be Respectful 🤝\n\
                     3️⃣ Stay On Topic 🎯\n\
                     4️⃣ No Spam 🚫\n\
                     5️⃣ Follow Admin Guidelines 📋\n\n\
                     ❗ {} warnings before removal ❗",
                    state.policy.config().profanity_limit
                ),
            )
            .await?;
        }

        "/test" => {
            bot.send_message(message.chat.id, "Bot is working! 🤖")
                .await?;
        }

        "/summary" => {
            let recent = state.policy.recent_messages();
            let summary = match state.ai.summarize(&recent).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::error!("AI summary failed: {}", e);
                    SUMMARY_FALLBACK.to_string()
                }
            };
            bot.send_message(
                message.chat.id,
                format!("Recent messages summary:\n\n{summary}"),
            )
            .await?;
        }

        "/bot" => {
            if args.is_empty() {
                bot.send_message(
                    message.chat.id,
                    "Please type a message after /bot to chat with me. \
                     For example: /bot Hello, how are you?",
                )
                .await?;
                return Ok(());
            }

            let reply = match state.ai.chat(args).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!("AI chat failed: {}", e);
                    CHAT_FALLBACK.to_string()
                }
            };
            bot.send_message(message.chat.id, reply).await?;
        }

        _ => {}
    }

    Ok(())
}
