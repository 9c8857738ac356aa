// Discord chat commands.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call core service
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation.

use crate::core::ai::{ChatService, CHAT_FALLBACK, SUMMARY_FALLBACK};
use crate::core::moderation::ModerationPolicy;
use crate::infra::ai::GeminiClient;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands and event handlers.
pub struct Data {
    pub policy: Arc<ModerationPolicy>,
    pub ai: Arc<ChatService<GeminiClient>>,
}

/// Chat with Dia.
#[poise::command(slash_command, prefix_command, rename = "bot")]
pub async fn bot_chat(
    ctx: Context<'_>,
    #[description = "What to say to Dia"]
    #[rest]
    message: Option<String>,
) -> Result<(), Error> {
    let Some(message) = message.filter(|m| !m.trim().is_empty()) else {
        ctx.say(
            "Please type a message after !bot to chat with me. \
             For example: !bot Hello, how are you?",
        )
        .await?;
        return Ok(());
    };

    // Typing indicator while the model thinks
    let _ = ctx.defer().await;

    let reply = match ctx.data().ai.chat(&message).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("AI chat failed: {}", e);
            CHAT_FALLBACK.to_string()
        }
    };

    // Discord caps messages at 2000 chars
    for chunk in reply.chars().collect::<Vec<char>>().chunks(2000) {
        ctx.say(chunk.iter().collect::<String>()).await?;
    }

    Ok(())
}

/// Summarize the recent conversation.
#[poise::command(slash_command, prefix_command)]
pub async fn summary(ctx: Context<'_>) -> Result<(), Error> {
    let _ = ctx.defer().await;

    let recent = ctx.data().policy.recent_messages();
    let summary = match ctx.data().ai.summarize(&recent).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("AI summary failed: {}", e);
            SUMMARY_FALLBACK.to_string()
        }
    };

    ctx.say(format!("Recent messages summary:\n\n{summary}"))
        .await?;
    Ok(())
}

/// Display the group rules.
#[poise::command(slash_command, prefix_command)]
pub async fn rules(ctx: Context<'_>) -> Result<(), Error> {
    let limit = ctx.data().policy.config().profanity_limit;
    ctx.say(format!(
        "📜 **GROUP RULES** 📜\n\n\
         1️⃣ **No Profanity** ❌\n\
         2️⃣ **Be Respectful** 🤝\n\
         3️⃣ **Stay On Topic** 🎯\n\
         4️⃣ **No Spam** 🚫\n\
         5️⃣ **Follow Admin Guidelines** 📋\n\n\
         ❗ {limit} warnings before removal ❗"
    ))
    .await?;
    Ok(())
}

/// Check if the bot is alive.
#[poise::command(slash_command, prefix_command)]
pub async fn test(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("Bot is working! 🤖").await?;
    Ok(())
}

/// Show what the bot can do.
#[poise::command(slash_command, prefix_command)]
pub async fn functions(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(
        "🤖 **Available Bot Commands** 🤖\n\n\
         1️⃣ **!bot [message]** - Chat with me! Example: !bot How are you?\n\
         2️⃣ **!rules** - Display group rules\n\
         3️⃣ **!summary** - Get a summary of recent messages\n\
         4️⃣ **!test** - Check if bot is working\n\
         5️⃣ **!warnings** - Check your warning count\n\
         6️⃣ **!functions** - Display this help message\n\n\
         ✨ Feel free to use any of these commands! I'm here to help! ✨",
    )
    .await?;
    Ok(())
}
