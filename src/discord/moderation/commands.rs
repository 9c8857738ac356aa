// Warning-management commands for moderators.

use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

type Context<'a> = poise::Context<'a, Data, Error>;

/// Check how many profanity warnings a user has.
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    let count = ctx.data().policy.warnings(&target.id.to_string());

    ctx.say(format!("<@{}> has {} warning(s).", target.id, count))
        .await?;
    Ok(())
}

/// Reset a user's warnings. Admin only.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn clearwarnings(
    ctx: Context<'_>,
    #[description = "User to clear warnings for"] user: serenity::User,
) -> Result<(), Error> {
    let cleared = ctx.data().policy.clear_warnings(&user.id.to_string());

    if cleared > 0 {
        ctx.say(format!("Warnings cleared for <@{}>.", user.id))
            .await?;
    } else {
        ctx.say(format!("<@{}> has no warnings to clear.", user.id))
            .await?;
    }
    Ok(())
}

/// Issue a manual warning notice. Mod only.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "KICK_MEMBERS"
)]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "User to warn"] user: serenity::User,
    #[description = "Reason for the warning"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());

    ctx.say(format!(
        "<@{}> has been warned by <@{}>!\nReason: {}",
        user.id,
        ctx.author().id,
        reason
    ))
    .await?;
    Ok(())
}

/// Ban a user. Admin only.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "BAN_MEMBERS"
)]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "User to ban"] user: serenity::User,
    #[description = "Reason for the ban"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());

    match guild_id
        .ban_with_reason(ctx.http(), user.id, 0, &reason)
        .await
    {
        Ok(()) => {
            ctx.say(format!(
                "<@{}> has been banned by <@{}>!",
                user.id,
                ctx.author().id
            ))
            .await?;
        }
        Err(e) => {
            tracing::error!("Failed to ban user {}: {}", user.id, e);
            ctx.say("Failed to ban user. Make sure I have the necessary permissions.")
                .await?;
        }
    }
    Ok(())
}
