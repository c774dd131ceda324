use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{event, Level};

use residentclock_common::prelude::*;
use residentclock_storage::prelude::*;

use crate::providers::{http_client, WeatherClient};

/// City every OpenWeatherMap account can query.
const HEALTHCHECK_LOCATION: &str = "London";

#[derive(Serialize, Debug)]
pub struct HealthCheck {
    pub time: i64,
    pub check_type: CheckType,
    pub success: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub enum CheckType {
    SettingsFile,
    WeatherApi,
}

pub async fn perform_healthchecks(config: &BotConfig) -> Result<String> {
    event!(Level::DEBUG, "Performing health checks");

    let checks = vec![
        check_settings_file(&JsonFileStore::new(&config.store_path)).await,
        check_weather_api(config).await?,
    ];

    let result = serde_json::to_string_pretty(&checks)
        .with_context(|| "Error serializing health check json")?;
    Ok(result)
}

async fn check_settings_file(store: &impl ConfigStore) -> HealthCheck {
    let start = Utc::now();
    event!(Level::TRACE, %start, "Starting settings file health check");

    let result = store.load_all().await;
    if let Err(error) = &result {
        event!(Level::WARN, ?error, "Settings file is not readable");
    }

    let end = Utc::now();
    event!(Level::TRACE, %end, "Finished settings file health check");

    HealthCheck {
        check_type: CheckType::SettingsFile,
        time: (end - start).num_milliseconds(),
        success: result.is_ok(),
    }
}

async fn check_weather_api(config: &BotConfig) -> Result<HealthCheck> {
    let start = Utc::now();
    event!(Level::TRACE, %start, "Starting weather api health check");

    let client = WeatherClient::new(http_client()?, &config.providers.weather, &config.weather_api_key);
    let result = client.forecast(HEALTHCHECK_LOCATION, Some(1)).await;
    if let Err(error) = &result {
        event!(Level::WARN, %error, "Weather api is not available");
    }

    let end = Utc::now();
    event!(Level::TRACE, %end, "Finished weather api health check");

    Ok(HealthCheck {
        check_type: CheckType::WeatherApi,
        time: (end - start).num_milliseconds(),
        success: result.is_ok(),
    })
}
