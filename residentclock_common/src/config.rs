//! Everything used to handle the application configuration.
//!
//! Create a new configuration as follows:
//! ```no_run
//! use residentclock_common::prelude::*;
//! let config = BotConfig::from_env().unwrap();
//! // or when you want to use a file and only overwrite from env
//! let config = BotConfig::from_env_and_file("../.config/config.toml").unwrap();
//! ```

use std::num::NonZeroU64;

use tracing::{event, Level};

pub use figment::Error;
use figment::{providers::{Env, Format, Toml}, Figment};

/// The application configuration.
///
/// You can use [from_env()](#from_env) or [from_env_and_file(path: &str)](#from_env_and_file) to create a configuration.
///
/// Settings:
/// * `discord_token`: `String`
/// * `owner_id`: `Option<NonZeroU64>`
/// * `weather_api_key`: `String`
/// * `aqi_api_key`: `String`
/// * `store_path`: `String`
/// * `quotes_path`: `String`
/// * `command_prefix`: `String`
/// * `clocktower`: [ClocktowerConfig]
/// * `providers`: [ProviderUrls]
#[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
pub struct BotConfig {
    /// The Discord API token.
    pub discord_token: String,
    /// Discord id of the bot owner.
    ///
    /// The owner may change server settings without being an administrator and can use the owner-only commands.
    #[serde(default)]
    pub owner_id: Option<NonZeroU64>,
    /// OpenWeatherMap API key.
    pub weather_api_key: String,
    /// World Air Quality Index API token.
    pub aqi_api_key: String,
    /// Path of the json file holding the per-server settings.
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Path of the json file holding the quotes the bot can say.
    #[serde(default = "default_quotes_path")]
    pub quotes_path: String,
    /// Prefix for text commands.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default)]
    pub clocktower: ClocktowerConfig,
    #[serde(default)]
    pub providers: ProviderUrls,
}

/// Timing of the clocktower loop.
#[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct ClocktowerConfig {
    /// How often the wall clock is checked, in seconds.
    pub poll_interval_secs: u64,
    /// Pause after a firing pass that renamed at least one channel, in seconds.
    pub cooldown_secs: u64,
}

impl Default for ClocktowerConfig {
    fn default() -> Self {
        Self { poll_interval_secs: 1, cooldown_secs: 299 }
    }
}

/// Base urls of the data providers.
///
/// Only worth changing when pointing the bot at a mock server.
#[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct ProviderUrls {
    pub weather: String,
    pub aqi: String,
    pub cat: String,
    pub dog: String,
    pub levels: String,
}

impl Default for ProviderUrls {
    fn default() -> Self {
        Self {
            weather: "https://api.openweathermap.org".into(),
            aqi: "https://api.waqi.info".into(),
            cat: "https://api.thecatapi.com".into(),
            dog: "https://api.thedogapi.com".into(),
            levels: "https://mee6.xyz".into(),
        }
    }
}

fn default_store_path() -> String {
    "data/servers.json".into()
}

fn default_quotes_path() -> String {
    "data/quotes.json".into()
}

fn default_command_prefix() -> String {
    "!".into()
}

const ENV_PREFIX: &str = "RESIDENTCLOCK_";

impl BotConfig {
    /// Create a configuration just from environment variables.
    ///
    /// This will read all variables prefixed with `RESIDENTCLOCK_` and try to serialize them into a `BotConfig`.
    /// Nested settings are separated by a double underscore, e.g. `RESIDENTCLOCK_CLOCKTOWER__COOLDOWN_SECS`.
    #[allow(dead_code)]
    #[tracing::instrument]
    pub fn from_env() -> Result<Self, Error> {
        let figment = Figment::new()
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract::<Self>()?.validated()
    }

    /// Create a configuration from the environment variables and the indicated file.
    ///
    /// The file is prioritised. You can use the environment variables to overwrite certain file values.
    ///
    /// For more info about how the environment variables are read, see [from_env()](#from_env).
    #[tracing::instrument]
    pub fn from_env_and_file(path: &str) -> Result<Self, Error> {
        event!(
            Level::DEBUG,
            "Building configuration from environment and file {}",
            path
        );

        let figment = Figment::new()
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract::<Self>()?.validated()
    }

    fn validated(self) -> Result<Self, Error> {
        if self.discord_token.trim().is_empty() {
            return Err(Error::from("The Discord token can not be empty"));
        }

        if self.clocktower.poll_interval_secs == 0 {
            return Err(Error::from("The clocktower poll interval must be at least one second"));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    //! Tests are run with the working directory set to the work space, not the directory of the source file.

    use super::*;

    const TEST_CONFIG: &str = r#"
            discord_token = "abc.def"
            owner_id = 948517362313863198
            weather_api_key = "weather"
            aqi_api_key = "aqi"
            store_path = "servers.json"
            "#;

    const TEST_CONFIG_FULL: &str = r#"
            discord_token = "abc.def"
            weather_api_key = "weather"
            aqi_api_key = "aqi"
            command_prefix = "?"

            [clocktower]
            cooldown_secs = 10

            [providers]
            weather = "http://localhost:8080"
            "#;

    const TEST_CONFIG_EMPTY_TOKEN: &str = r#"
            discord_token = " "
            weather_api_key = "weather"
            aqi_api_key = "aqi"
            "#;

    #[test]
    fn can_deserialize_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", TEST_CONFIG)?;

            let expected = BotConfig {
                discord_token: "abc.def".into(),
                owner_id: Some(NonZeroU64::new(948517362313863198).unwrap()),
                weather_api_key: "weather".into(),
                aqi_api_key: "aqi".into(),
                store_path: "servers.json".into(),
                quotes_path: "data/quotes.json".into(),
                command_prefix: "!".into(),
                clocktower: ClocktowerConfig::default(),
                providers: ProviderUrls::default(),
            };

            let config = BotConfig::from_env_and_file("config.toml")?;
            assert_eq!(config, expected);

            Ok(())
        });
    }

    #[test]
    fn nested_tables_keep_defaults_for_missing_keys() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", TEST_CONFIG_FULL)?;

            let config = BotConfig::from_env_and_file("config.toml")?;

            assert_eq!(config.owner_id, None);
            assert_eq!(config.store_path, "data/servers.json");
            assert_eq!(config.command_prefix, "?");
            assert_eq!(config.clocktower, ClocktowerConfig { poll_interval_secs: 1, cooldown_secs: 10 });
            assert_eq!(config.providers.weather, "http://localhost:8080");
            assert_eq!(config.providers.aqi, "https://api.waqi.info");

            Ok(())
        });
    }

    #[test]
    fn env_overwrites_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", TEST_CONFIG)?;

            jail.set_env(format!("{}{}", ENV_PREFIX, "DISCORD_TOKEN"), "ghi.jkl");
            jail.set_env(format!("{}{}", ENV_PREFIX, "CLOCKTOWER__COOLDOWN_SECS"), "60");

            let config = BotConfig::from_env_and_file("config.toml")?;
            assert_eq!(config.discord_token, "ghi.jkl");
            assert_eq!(config.clocktower.cooldown_secs, 60);
            assert_eq!(config.weather_api_key, "weather");

            Ok(())
        });
    }

    #[test]
    fn error_when_token_empty() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", TEST_CONFIG_EMPTY_TOKEN)?;

            BotConfig::from_env_and_file("config.toml").expect_err("An empty token should have been rejected");

            Ok(())
        })
    }
}
