use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use poise::serenity_prelude::{self as serenity, ActivityData};
use tracing::*;

use residentclock_common::{cli, cli::Commands, prelude::*};
use residentclock_storage::prelude::*;

use crate::discord::{admin, commands, events};
use crate::healthchecks::perform_healthchecks;
use crate::job::{job_scheduler, Job};
use crate::providers::{http_client, AirQualityClient, ImageClient, LevelsClient, WeatherClient};

mod discord;
mod embed;
mod forecast;
mod healthchecks;
mod job;
mod moon;
mod providers;
mod timezone;

pub struct ServerData {
    pub store: Arc<dyn ConfigStore>,
    pub quotes: Arc<dyn QuoteStore>,
    pub weather: WeatherClient,
    pub air_quality: AirQualityClient,
    pub images: ImageClient,
    pub levels: LevelsClient,
    pub config: BotConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = cli::Args::parse();
    let config_file_path = args.config;

    event!(Level::DEBUG, %config_file_path, "Reading configuration");
    // Load application config
    let config = BotConfig::from_env_and_file(&config_file_path)?;

    if let Some(Commands::Healthcheck) = args.command {
        let checks_output = perform_healthchecks(&config).await?;
        println!("{}", checks_output);
        return Ok(());
    }

    // Storage setup
    event!(Level::DEBUG, store_path = %config.store_path, "Opening settings store");
    let store: Arc<dyn ConfigStore> = Arc::new(JsonFileStore::new(&config.store_path));
    let quotes: Arc<dyn QuoteStore> = Arc::new(JsonQuoteFile::new(&config.quotes_path));

    // Provider setup
    let http = http_client()?;
    let providers = &config.providers;
    let weather = WeatherClient::new(http.clone(), &providers.weather, &config.weather_api_key);
    let air_quality = AirQualityClient::new(http.clone(), &providers.aqi, &config.aqi_api_key);
    let images = ImageClient::new(http.clone(), &providers.cat, &providers.dog);
    let levels = LevelsClient::new(http, &providers.levels);

    // Discord setup
    event!(Level::DEBUG, "Discord client setup");

    let owners: HashSet<serenity::UserId> = config.owner_id.map(serenity::UserId::from).into_iter().collect();
    let setup_store = store.clone();
    let bot_config = config.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::forecast(),
                commands::temperature(),
                commands::time(),
                commands::aqi(),
                commands::detailed_aqi(),
                commands::meow(),
                commands::woof(),
                commands::cmpxp(),
                commands::moon(),
                commands::quote(),
                commands::ping(),
                commands::invite(),
                commands::help(),
                admin::changedefault(),
                admin::clocktower(),
                admin::serverlist(),
                admin::emergencyleave(),
                admin::q_add(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                case_insensitive_commands: true,
                ..Default::default()
            },
            owners,
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| Box::pin(events::event_handler(ctx, event, framework, data)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            ctx.set_activity(Some(ActivityData::playing("with time and space")));

            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .with_context(|| "Error registering commands")?;

                let server_ids: Vec<u64> = ready.guilds.iter().map(|g| g.id.get()).collect();
                let report = setup_store
                    .reconcile(&server_ids)
                    .await
                    .with_context(|| "Error reconciling server settings")?;
                event!(Level::INFO, servers = server_ids.len(), added = report.added.len(), "Ready");

                Ok(ServerData { store: setup_store, quotes, weather, air_quality, images, levels, config: bot_config })
            })
        })
        .build();

    // Set up background scheduling
    event!(Level::INFO, "Setting up background jobs");
    let jobs: Vec<Box<dyn Job>> = vec![discord::jobs::clocktower()];

    let token = config.discord_token.as_str();
    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;
    let mut discord_client = serenity::ClientBuilder::new(token, intents).framework(framework).await?;
    let http_client = Arc::new(serenity::HttpBuilder::new(token).build());

    let (discord_result, scheduler_result) = tokio::join!(
        discord_client.start_autosharded(),
        job_scheduler(&config.clocktower, &jobs, store, http_client)
    );

    if let Err(scheduler_err) = scheduler_result {
        event!(Level::ERROR, "{:?}", &scheduler_err);
    }

    if let Err(discord_error) = discord_result {
        event!(Level::ERROR, "{:?}", &discord_error);
    }

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, ServerData, anyhow::Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            event!(Level::ERROR, "Failed to start the bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            event!(Level::ERROR, command = %ctx.command().qualified_name, "{:?}", error);
            if let Err(e) = ctx.say("Something went wrong, please try again later.").await {
                event!(Level::ERROR, "Error while reporting a command error: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                event!(Level::ERROR, "Error while handling error: {}", e);
            }
        }
    }
}
