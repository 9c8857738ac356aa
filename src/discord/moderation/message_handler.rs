// Discord-specific moderation handling - translates policy verdicts into
// Discord actions (delete, warn, ban, timeout).

use crate::core::moderation::{Verdict, ViolationKind};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

/// Run an inbound message through the moderation policy and apply the
/// verdict.
///
/// Returns `true` if the message was a violation and was handled.
pub async fn moderate_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<bool, Error> {
    // Skip bots (including ourselves)
    if msg.author.bot {
        return Ok(false);
    }

    // Only moderate guild messages
    let Some(guild_id) = msg.guild_id else {
        return Ok(false);
    };

    let sender_id = msg.author.id.to_string();
    let is_command = msg.content.starts_with('!');
    let now_ms = chrono::Utc::now().timestamp_millis();

    let verdict = data
        .policy
        .evaluate(&sender_id, &msg.content, is_command, now_ms);

    match verdict {
        Verdict::Pass => Ok(false),

        Verdict::Warn {
            kind: ViolationKind::Profanity,
            count,
            ..
        } => {
            if let Err(e) = msg.delete(&ctx.http).await {
                tracing::warn!("Failed to delete profane message: {}", e);
            }

            let limit = data.policy.config().profanity_limit;
            let notice = format!(
                "<@{}>, please watch your language! Warning {}/{}",
                msg.author.id, count, limit
            );
            if let Err(e) = msg.channel_id.say(&ctx.http, notice).await {
                tracing::warn!("Failed to send profanity warning: {}", e);
            }
            Ok(true)
        }

        Verdict::Warn {
            kind: ViolationKind::Spam,
            count,
            ..
        } => {
            let limit = data.policy.config().spam_limit;
            let notice = format!(
                "⚠️ <@{}> Stop spamming! Warning {}/{}",
                msg.author.id, count, limit
            );
            if let Err(e) = msg.channel_id.say(&ctx.http, notice).await {
                tracing::warn!("Failed to send spam warning: {}", e);
            }
            Ok(true)
        }

        Verdict::Escalate {
            kind: ViolationKind::Profanity,
        } => {
            if let Err(e) = msg.delete(&ctx.http).await {
                tracing::warn!("Failed to delete profane message: {}", e);
            }

            let limit = data.policy.config().profanity_limit;
            let reason = format!("Exceeded maximum warnings ({})", limit);

            match guild_id
                .ban_with_reason(&ctx.http, msg.author.id, 0, &reason)
                .await
            {
                Ok(()) => {
                    let notice = format!(
                        "<@{}> has been banned for exceeding {} warnings!",
                        msg.author.id, limit
                    );
                    if let Err(e) = msg.channel_id.say(&ctx.http, notice).await {
                        tracing::warn!("Failed to send ban notification: {}", e);
                    }
                }
                Err(e) => {
                    // Best effort only - the ban is never retried
                    tracing::error!("Failed to ban user {}: {}", msg.author.id, e);
                    let _ = msg
                        .channel_id
                        .say(&ctx.http, "Failed to ban user. An admin has been notified.")
                        .await;
                }
            }
            Ok(true)
        }

        Verdict::Escalate {
            kind: ViolationKind::Spam,
        } => {
            // Spam maps to a 1-hour timeout rather than a ban
            let timeout_secs: i64 = 3600;
            let timeout_until = match serenity::Timestamp::from_unix_timestamp(
                chrono::Utc::now().timestamp() + timeout_secs,
            ) {
                Ok(ts) => ts,
                Err(e) => {
                    tracing::error!("Failed to create timeout timestamp: {}", e);
                    return Ok(true);
                }
            };

            match guild_id
                .edit_member(
                    &ctx.http,
                    msg.author.id,
                    serenity::EditMember::new().disable_communication_until_datetime(timeout_until),
                )
                .await
            {
                Ok(_) => {
                    let notice = format!(
                        "🔇 <@{}> has been muted for {} minutes for spamming!",
                        msg.author.id,
                        timeout_secs / 60
                    );
                    if let Err(e) = msg.channel_id.say(&ctx.http, notice).await {
                        tracing::warn!("Failed to send mute notification: {}", e);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to mute user {}: {}", msg.author.id, e);
                    let _ = msg
                        .channel_id
                        .say(&ctx.http, "Failed to mute user. An admin has been notified.")
                        .await;
                }
            }
            Ok(true)
        }
    }
}
