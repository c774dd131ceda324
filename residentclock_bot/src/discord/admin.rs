//! Commands that change server settings, and the bot owner's maintenance commands.

use anyhow::{Context as _, Result};
use tracing::{event, field, trace_span, Level};

use residentclock_storage::prelude::*;

use crate::discord::{reply, reply_error, server_settings, views, Context};
use crate::timezone;

const MISSING_PERMISSIONS: &str =
    "You lack the required permissions to change these settings. Please contact an Admin for help.";

/// Allows the bot owner and server administrators.
async fn is_owner_or_admin(ctx: Context<'_>) -> Result<bool> {
    if ctx.framework().options().owners.contains(&ctx.author().id) {
        return Ok(true);
    }

    let is_admin = match ctx.author_member().await {
        Some(member) => {
            member.permissions.is_some_and(|p| p.administrator())
                || ctx.guild().is_some_and(|guild| {
                    #[allow(deprecated)]
                    let permissions = guild.member_permissions(&member);
                    permissions.administrator()
                })
        }
        None => false,
    };

    if !is_admin {
        event!(Level::DEBUG, user = %ctx.author().id, "Refused settings change");
        reply_error(ctx, MISSING_PERMISSIONS).await?;
    }

    Ok(is_admin)
}

/// Change a default setting of this server.
///
/// Settings: `defaultCity`, `AQI_defaultCity`, `Timezone` (whole hours from UTC) and `ClockChannel`.
///
/// Example: `!changedefault defaultCity Paris, FR`
#[poise::command(prefix_command, slash_command, guild_only, check = "is_owner_or_admin", category = "Admin")]
pub async fn changedefault(
    ctx: Context<'_>,
    #[description = "The setting to change"] key: String,
    #[description = "The new value"]
    #[rest]
    value: String,
) -> Result<()> {
    let span = trace_span!("residentclock.discord.changedefault", key = %key, server_id = field::Empty);

    let key: SettingKey = match key.parse() {
        Ok(key) => key,
        Err(error) => return reply_error(ctx, error).await,
    };

    let mut settings = server_settings(ctx).await?;
    span.record("server_id", settings.server_id);

    let old = match settings.set(key, &value) {
        Ok(old) => old,
        Err(error) => return reply_error(ctx, error).await,
    };
    let new = settings.value_of(key);

    ctx.data().store.upsert(settings).await?;
    span.in_scope(|| event!(Level::INFO, %old, %new, "Changed server setting"));

    reply(ctx, views::setting_changed(key, &old, &new)).await
}

/// Make a channel show the time, or pass `none` to stop.
///
/// The channel name is updated every five minutes. The offset is in whole hours from UTC.
///
/// Example: `!clocktower #clock -8`
#[poise::command(prefix_command, slash_command, guild_only, check = "is_owner_or_admin", category = "Admin")]
pub async fn clocktower(
    ctx: Context<'_>,
    #[description = "Channel to rename, or none"] channel: String,
    #[description = "Hours from UTC, between -12 and 12"] offset: i64,
) -> Result<()> {
    if let Err(error) = timezone::abbreviation(offset) {
        return reply_error(ctx, error).await;
    }

    let mut settings = server_settings(ctx).await?;
    if let Err(error) = settings.set(SettingKey::ClockChannel, &channel) {
        return reply_error(ctx, error).await;
    }
    settings.timezone_offset = offset;

    event!(Level::INFO, server_id = settings.server_id, clock_channel = ?settings.clock_channel, offset, "Assigned clocktower");
    ctx.data().store.upsert(settings).await?;

    reply(ctx, views::clocktower_added(&channel, offset)).await
}

/// List every server the bot is a member of.
#[poise::command(prefix_command, owners_only, hide_in_help)]
pub async fn serverlist(ctx: Context<'_>) -> Result<()> {
    let cache = ctx.serenity_context();
    let names: Vec<String> = ctx
        .cache()
        .guilds()
        .into_iter()
        .map(|guild_id| guild_id.name(cache).unwrap_or_else(|| guild_id.to_string()))
        .collect();

    reply(ctx, views::server_list(names.iter().map(String::as_str))).await
}

/// Leave a server by name.
#[poise::command(prefix_command, owners_only, hide_in_help)]
pub async fn emergencyleave(
    ctx: Context<'_>,
    #[rest] guild_name: String,
) -> Result<()> {
    let cache = ctx.serenity_context();
    let guild = ctx
        .cache()
        .guilds()
        .into_iter()
        .find(|guild_id| guild_id.name(cache).as_deref() == Some(guild_name.as_str()));

    let Some(guild_id) = guild else {
        ctx.say("I don't recognize that guild.").await?;
        return Ok(());
    };

    guild_id
        .leave(ctx.http())
        .await
        .with_context(|| format!("Error leaving guild {guild_id}"))?;

    event!(Level::WARN, %guild_id, %guild_name, "Left guild on request of the owner");
    ctx.say(format!(":ok_hand: Left guild: {guild_name} ({guild_id})")).await?;

    Ok(())
}

/// Teach the bot a new quote.
#[poise::command(prefix_command, owners_only, hide_in_help)]
pub async fn q_add(ctx: Context<'_>, #[rest] quote: String) -> Result<()> {
    let count = ctx.data().quotes.add_quote(quote.clone()).await?;
    event!(Level::INFO, count, "Added a quote");

    reply(ctx, views::quote_added(&quote)).await
}
