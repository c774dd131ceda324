use anyhow::Result;
use poise::serenity_prelude as serenity;
use tracing::{event, instrument, Level};

use residentclock_storage::prelude::*;

use crate::ServerData;

const GREETING: &str = "Tick Tock! I am Resident Clock, a multi-purpose bot capable of doing all sorts of fun stuff!\nWant to get started? Use !help for a list of commands!";

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, ServerData, anyhow::Error>,
    data: &ServerData,
) -> Result<()> {
    if let serenity::FullEvent::GuildCreate { guild, is_new: Some(true) } = event {
        on_guild_join(ctx, guild, data).await?;
    }

    Ok(())
}

#[instrument(level = "debug", name = "residentclock.discord.guild_join", skip_all, fields(guild_id = %guild.id))]
async fn on_guild_join(ctx: &serenity::Context, guild: &serenity::Guild, data: &ServerData) -> Result<()> {
    let report = data.store.reconcile(&[guild.id.get()]).await?;
    event!(Level::INFO, added = report.added.len(), "Joined a new server");

    let bot_id = ctx.cache.current_user().id;
    let bot = guild.id.member(ctx, bot_id).await?;
    let candidates = speaking_order(
        guild
            .channels
            .values()
            .filter(|channel| channel.kind == serenity::ChannelType::Text)
            .map(|channel| (channel.position, guild.user_permissions_in(channel, &bot), channel.id)),
    );

    for channel_id in candidates {
        match channel_id.say(&ctx.http, GREETING).await {
            Ok(_) => return Ok(()),
            Err(error) => event!(Level::TRACE, %channel_id, ?error, "Can't greet in channel"),
        }
    }

    event!(Level::DEBUG, "Found no channel to greet in");
    Ok(())
}

/// Channels the bot may send messages in, sorted by their position in the channel list.
fn speaking_order<T>(channels: impl IntoIterator<Item = (u16, serenity::Permissions, T)>) -> Vec<T> {
    let mut channels: Vec<(u16, T)> = channels
        .into_iter()
        .filter(|(_, permissions, _)| permissions.send_messages())
        .map(|(position, _, channel)| (position, channel))
        .collect();
    channels.sort_by_key(|(position, _)| *position);

    channels.into_iter().map(|(_, channel)| channel).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEAK: serenity::Permissions = serenity::Permissions::SEND_MESSAGES;
    const READ_ONLY: serenity::Permissions = serenity::Permissions::VIEW_CHANNEL;

    #[test]
    fn greets_top_channel_first() {
        let order = speaking_order([(3, SPEAK, "memes"), (0, SPEAK, "general"), (1, SPEAK, "rules")]);

        assert_eq!(order, vec!["general", "rules", "memes"]);
    }

    #[test]
    fn skips_channels_the_bot_cannot_speak_in() {
        let order = speaking_order([(0, READ_ONLY, "rules"), (1, SPEAK, "general"), (2, serenity::Permissions::empty(), "mods")]);

        assert_eq!(order, vec!["general"]);
    }
}
