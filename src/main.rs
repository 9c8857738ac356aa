// This is the entry point of the Dia moderation bots.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic moderation policy + AI prompts)
// - `infra/` = Implementations of core traits (Gemini API client)
// - `discord/` = Discord-specific adapters (commands, events)
// - `telegram/` = Telegram-specific adapters (dispatcher, handlers)
//
// This file's job is to:
// 1. Load configuration (fail fast on a missing profanity list)
// 2. Initialize services (dependency injection)
// 3. Start whichever platform adapters have tokens configured

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "telegram/telegram_layer.rs"]
mod telegram;

use crate::core::ai::ChatService;
use crate::core::moderation::{ModerationConfig, ModerationPolicy, ProfanityList};
use crate::discord::moderation::message_handler;
use crate::discord::{Data, Error};
use crate::infra::ai::GeminiClient;
use crate::telegram::TelegramState;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

const DEFAULT_PROFANITY_LIST: &str = "shared/profanity-list.json";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

// Sender state older than the spam window is dead weight; sweep it hourly
// so a long-running process doesn't grow without bound.
const PRUNE_INTERVAL_SECS: u64 = 60 * 60;
const PRUNE_MAX_IDLE_MS: i64 = 60 * 60 * 1000;

/// Event handler for non-command Discord events.
/// Every inbound message goes through the moderation policy here.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        match message_handler::moderate_message(ctx, new_message, data).await {
            Ok(true) => {
                tracing::info!(
                    user_id = new_message.author.id.get(),
                    "Moderation action taken"
                );
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Error moderating message: {}", e);
            }
        }
    }

    Ok(())
}

/// Background sweep of idle sender state for one platform's policy.
fn spawn_prune_task(policy: Arc<ModerationPolicy>, platform: &'static str) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(PRUNE_INTERVAL_SECS)).await;

            let now_ms = chrono::Utc::now().timestamp_millis();
            let dropped = policy.prune_idle(now_ms, PRUNE_MAX_IDLE_MS);
            if dropped > 0 {
                tracing::debug!(platform, dropped, "Pruned idle sender state");
            }
        }
    });
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = ModerationConfig::from_env();

    // Fail fast: an unreadable word list must not silently become an empty
    // one, or the bot looks healthy while filtering nothing.
    let list_path = std::env::var("PROFANITY_LIST_PATH")
        .unwrap_or_else(|_| DEFAULT_PROFANITY_LIST.to_string());
    let profanity = ProfanityList::load(&list_path)
        .unwrap_or_else(|e| panic!("Cannot start without a profanity list: {e}"));
    tracing::info!(words = profanity.len(), path = %list_path, "Loaded profanity list");

    let gemini_api_key =
        std::env::var("GEMINI_API_KEY").expect("Missing GEMINI_API_KEY environment variable!");
    let gemini_model =
        std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

    let discord_token = std::env::var("DISCORD_TOKEN").ok();
    let telegram_token = std::env::var("TELEGRAM_TOKEN").ok();
    if discord_token.is_none() && telegram_token.is_none() {
        panic!("Set DISCORD_TOKEN and/or TELEGRAM_TOKEN to start at least one bot");
    }

    // ========================================================================
    // TELEGRAM BOT
    // ========================================================================
    // Each adapter gets its own policy instance - counters are never shared
    // across platforms.

    let mut telegram_task = None;
    if let Some(token) = telegram_token {
        let policy = Arc::new(ModerationPolicy::new(config.clone(), profanity.clone()));
        let ai = Arc::new(ChatService::new(GeminiClient::new(
            gemini_api_key.clone(),
            gemini_model.clone(),
        )));
        spawn_prune_task(Arc::clone(&policy), "telegram");

        let state = Arc::new(TelegramState { policy, ai });
        let bot = teloxide::Bot::new(token);
        telegram_task = Some(tokio::spawn(telegram::handlers::run(bot, state)));
    }

    // ========================================================================
    // DISCORD BOT
    // ========================================================================

    if let Some(token) = discord_token {
        let policy = Arc::new(ModerationPolicy::new(config.clone(), profanity.clone()));
        let ai = Arc::new(ChatService::new(GeminiClient::new(
            gemini_api_key.clone(),
            gemini_model.clone(),
        )));
        spawn_prune_task(Arc::clone(&policy), "discord");

        let data = Data { policy, ai };

        let intents = serenity::GatewayIntents::GUILD_MESSAGES
            | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
            | serenity::GatewayIntents::GUILDS
            | serenity::GatewayIntents::GUILD_MEMBERS;

        let framework = poise::Framework::builder()
            .options(poise::FrameworkOptions {
                // Register all our commands here
                commands: vec![
                    discord::commands::chat::bot_chat(),
                    discord::commands::chat::summary(),
                    discord::commands::chat::rules(),
                    discord::commands::chat::test(),
                    discord::commands::chat::functions(),
                    discord::moderation::commands::warnings(),
                    discord::moderation::commands::clearwarnings(),
                    discord::moderation::commands::warn(),
                    discord::moderation::commands::ban(),
                ],
                // The bots have always used "!" text commands alongside slash commands
                prefix_options: poise::PrefixFrameworkOptions {
                    prefix: Some("!".to_string()),
                    ..Default::default()
                },
                // Event handler runs every message through the moderation policy
                event_handler: |ctx, event, framework, data| {
                    Box::pin(event_handler(ctx, event, framework, data))
                },
                ..Default::default()
            })
            .setup(|ctx, _ready, framework| {
                Box::pin(async move {
                    println!("🤖 Bot is starting up...");

                    // Register slash commands globally (can take up to an hour
                    // to propagate)
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                    println!("✅ Commands registered!");
                    println!("🚀 Bot is ready!");

                    Ok(data)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(token, intents)
            .framework(framework)
            .await
            .expect("Error creating client");

        client.start().await.expect("Error running Discord bot");
    } else if let Some(task) = telegram_task {
        // Telegram-only deployment: keep the process alive for the dispatcher
        task.await.expect("Telegram dispatcher panicked");
    }
}
