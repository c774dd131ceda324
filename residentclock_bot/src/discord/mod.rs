use std::fmt::Display;

use anyhow::Result;
use tracing::{event, Level};

use residentclock_storage::prelude::*;

use crate::embed::EmbedView;
use crate::ServerData;

pub type Context<'a> = poise::Context<'a, ServerData, anyhow::Error>;

pub mod admin;
pub mod commands;
pub mod events;
pub mod jobs;
pub mod views;


/// Settings of the server the command was sent from. Direct messages get the defaults.
pub(crate) async fn server_settings(ctx: Context<'_>) -> Result<ServerConfig> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(ServerConfig::new(0));
    };

    let server_id = guild_id.get();
    let settings = ctx.data().store.get(server_id).await?;

    Ok(settings.unwrap_or_else(|| ServerConfig::new(server_id)))
}

pub(crate) async fn reply(ctx: Context<'_>, view: EmbedView) -> Result<()> {
    ctx.send(view.into()).await?;

    Ok(())
}

/// Show an error the user can act on. These don't go through the framework error handler.
pub(crate) async fn reply_error(ctx: Context<'_>, error: impl Display) -> Result<()> {
    event!(Level::DEBUG, %error, "Replying with an error");

    reply(ctx, EmbedView::error(error.to_string())).await
}
