use anyhow::Result;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use rand::seq::SliceRandom;
use tracing::{event, Level};

use residentclock_storage::prelude::QuoteStore;

use crate::discord::{reply, reply_error, server_settings, views, Context};
use crate::embed::EmbedView;
use crate::forecast::{self, render};
use crate::moon::lunation_position;
use crate::providers::{levels::compare_xp, Animal};

/// Show the weather forecast.
///
/// Give a location, a day of the week, a number of days (up to 5) or a location together with \
/// either a day or a number of days. Without a location the server's default city is used.
///
/// Examples: `!forecast`, `!forecast Paris`, `!forecast friday`, `!forecast 3 "New York"`
#[poise::command(prefix_command, slash_command, category = "Weather")]
pub async fn forecast(
    ctx: Context<'_>,
    #[description = "A location, a day of the week or a number of days"] first: Option<String>,
    #[description = "A location, a day of the week or a number of days"] second: Option<String>,
) -> Result<()> {
    event!(Level::TRACE, ?first, ?second, "Received forecast command");
    let settings = server_settings(ctx).await?;

    let request = match forecast::resolve(first.as_deref(), second.as_deref(), &settings) {
        Ok(request) => request,
        Err(error) => return reply_error(ctx, error).await,
    };
    event!(Level::DEBUG, ?request, mode = ?request.mode(), "Resolved forecast request");

    ctx.defer().await?;

    let forecast = match ctx.data().weather.forecast(&request.location, None).await {
        Ok(forecast) => forecast,
        Err(error) => return reply_error(ctx, error).await,
    };

    match render::forecast(&forecast, &request.day_selector, Utc::now()) {
        Ok(view) => reply(ctx, view).await,
        Err(error) => reply_error(ctx, error).await,
    }
}

/// Show the current temperature.
#[poise::command(prefix_command, slash_command, category = "Weather")]
pub async fn temperature(
    ctx: Context<'_>,
    #[description = "Location, defaults to the server's city"]
    location: Option<String>,
) -> Result<()> {
    let location = location_or_default(ctx, location).await?;

    match ctx.data().weather.forecast(&location, Some(1)).await {
        Ok(forecast) => match render::temperature(&forecast) {
            Ok(view) => reply(ctx, view).await,
            Err(error) => reply_error(ctx, error).await,
        },
        Err(error) => reply_error(ctx, error).await,
    }
}

/// Show the current time somewhere.
#[poise::command(prefix_command, slash_command, category = "Weather")]
pub async fn time(
    ctx: Context<'_>,
    #[description = "Location, defaults to the server's city"]
    location: Option<String>,
) -> Result<()> {
    let location = location_or_default(ctx, location).await?;

    match ctx.data().weather.forecast(&location, Some(1)).await {
        Ok(forecast) => match render::local_time(&forecast, Utc::now()) {
            Ok(view) => reply(ctx, view).await,
            Err(error) => reply_error(ctx, error).await,
        },
        Err(error) => reply_error(ctx, error).await,
    }
}

/// Show the air quality index.
#[poise::command(prefix_command, slash_command, category = "Weather")]
pub async fn aqi(
    ctx: Context<'_>,
    #[description = "Location, defaults to the server's air quality city"]
    location: Option<String>,
) -> Result<()> {
    let location = aqi_location_or_default(ctx, location).await?;

    match ctx.data().air_quality.feed(&location).await {
        Ok(quality) => reply(ctx, views::air_quality_summary(&location, &quality)).await,
        Err(error) => reply_error(ctx, error).await,
    }
}

/// Show the air quality index together with the individual pollutants.
#[poise::command(prefix_command, slash_command, category = "Weather")]
pub async fn detailed_aqi(
    ctx: Context<'_>,
    #[description = "Location, defaults to the server's air quality city"]
    location: Option<String>,
) -> Result<()> {
    let location = aqi_location_or_default(ctx, location).await?;

    match ctx.data().air_quality.feed(&location).await {
        Ok(quality) => reply(ctx, views::air_quality_detailed(&location, &quality)).await,
        Err(error) => reply_error(ctx, error).await,
    }
}

/// A random cat.
#[poise::command(prefix_command, slash_command, category = "Fun")]
pub async fn meow(ctx: Context<'_>) -> Result<()> {
    random_image(ctx, Animal::Cat).await
}

/// A random dog.
#[poise::command(prefix_command, slash_command, category = "Fun")]
pub async fn woof(ctx: Context<'_>) -> Result<()> {
    random_image(ctx, Animal::Dog).await
}

async fn random_image(ctx: Context<'_>, animal: Animal) -> Result<()> {
    match ctx.data().images.random(animal).await {
        Ok(url) => reply(ctx, EmbedView::new("").image(url)).await,
        Err(error) => reply_error(ctx, error).await,
    }
}

/// Compare the Mee6 experience of two users.
///
/// Without a second user you are compared with the first one.
#[poise::command(prefix_command, slash_command, guild_only, category = "Fun")]
pub async fn cmpxp(
    ctx: Context<'_>,
    #[description = "User to compare"] user: serenity::User,
    #[description = "Other user, defaults to you"] other: Option<serenity::User>,
) -> Result<()> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let other = other.unwrap_or_else(|| ctx.author().clone());
    let levels = &ctx.data().levels;

    let mut experience = Vec::with_capacity(2);
    for someone in [&user, &other] {
        match levels.user_xp(guild_id.get(), someone.id.get()).await {
            Ok(Some(xp)) => experience.push(xp),
            Ok(None) => {
                return reply_error(ctx, format!("{} is not on the leaderboard of this server.", someone.name)).await
            }
            Err(error) => return reply_error(ctx, error).await,
        }
    }

    let first = serenity::Mention::from(user.id).to_string();
    let second = serenity::Mention::from(other.id).to_string();
    let view = EmbedView::new(format!("Comparing XP between {} and {}:", user.name, other.name))
        .description(compare_xp((first.as_str(), experience[0]), (second.as_str(), experience[1])));

    reply(ctx, view).await
}

/// Show the current phase of the moon.
#[poise::command(prefix_command, slash_command, category = "Fun")]
pub async fn moon(ctx: Context<'_>) -> Result<()> {
    reply(ctx, views::moon(lunation_position(Utc::now()))).await
}

/// Say something witty.
#[poise::command(prefix_command, slash_command, category = "Fun")]
pub async fn quote(ctx: Context<'_>) -> Result<()> {
    let quotes = ctx.data().quotes.load_quotes().await?;

    match pick_quote(&quotes) {
        Some(quote) => {
            ctx.say(quote).await?;
            Ok(())
        }
        None => reply_error(ctx, "I don't know any quotes yet.").await,
    }
}

fn pick_quote(quotes: &[String]) -> Option<&str> {
    quotes.choose(&mut rand::thread_rng()).map(String::as_str)
}

/// Check whether the bot is alive.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn ping(ctx: Context<'_>) -> Result<()> {
    let latency = ctx.ping().await;
    ctx.say(format!("Pong! ({} ms)", latency.as_millis())).await?;

    Ok(())
}

/// Get a link to invite the bot to another server.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn invite(ctx: Context<'_>) -> Result<()> {
    reply(ctx, views::invite(ctx.framework().bot_id.get())).await
}

/// Show this menu.
#[poise::command(prefix_command, slash_command, track_edits, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<()> {
    let bottom_text = format!("Type {}help command for more info on a command.", ctx.data().config.command_prefix);
    let config = poise::builtins::HelpConfiguration {
        extra_text_at_bottom: &bottom_text,
        ..Default::default()
    };
    poise::builtins::help(ctx, command.as_deref(), config).await?;

    Ok(())
}

async fn location_or_default(ctx: Context<'_>, location: Option<String>) -> Result<String> {
    let location = match location {
        Some(location) => location,
        None => server_settings(ctx).await?.default_city,
    };

    Ok(location.replace(' ', ""))
}

async fn aqi_location_or_default(ctx: Context<'_>, location: Option<String>) -> Result<String> {
    match location {
        Some(location) => Ok(location),
        None => Ok(server_settings(ctx).await?.default_aqi_city),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_one_of_the_known_quotes() {
        let quotes = vec!["Tick.".to_string(), "Tock.".to_string()];

        let picked = pick_quote(&quotes).unwrap();

        assert!(quotes.iter().any(|q| q == picked));
    }

    #[test]
    fn no_quotes_picks_nothing() {
        assert_eq!(pick_quote(&[]), None);
    }
}
