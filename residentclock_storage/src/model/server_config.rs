use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::lenient;

/// City used by the weather commands when a server never picked one.
pub const DEFAULT_CITY: &str = "Victoria, CA";
/// City used by the air quality commands when a server never picked one.
pub const DEFAULT_AQI_CITY: &str = "Victoria";
/// Hour offset from UTC when a server never picked one.
pub const DEFAULT_TIMEZONE_OFFSET: i64 = 0;

/// Contains the settings of a single server (guild).
///
/// The serialized field names match the settings file format the bot has always used, so existing
/// files keep working. Missing fields are filled with the defaults on load.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(rename = "serverID", deserialize_with = "lenient::u64")]
    pub server_id: u64,
    /// Location used by the weather, temperature, time and forecast commands.
    #[serde(rename = "defaultCity", default = "default_city")]
    pub default_city: String,
    /// Location used by the air quality commands.
    #[serde(rename = "AQI_defaultCity", default = "default_aqi_city")]
    pub default_aqi_city: String,
    /// Whole hours from UTC shown by the clocktower.
    #[serde(rename = "Timezone", default, deserialize_with = "lenient::i64")]
    pub timezone_offset: i64,
    /// Channel renamed by the clocktower. `None` disables the clocktower for this server.
    #[serde(rename = "ClockChannel", default, deserialize_with = "lenient::option_u64")]
    pub clock_channel: Option<u64>,
}

fn default_city() -> String {
    DEFAULT_CITY.into()
}

fn default_aqi_city() -> String {
    DEFAULT_AQI_CITY.into()
}

impl ServerConfig {
    /// Settings for a server the bot has never seen before.
    pub fn new(server_id: u64) -> Self {
        Self {
            server_id,
            default_city: default_city(),
            default_aqi_city: default_aqi_city(),
            timezone_offset: DEFAULT_TIMEZONE_OFFSET,
            clock_channel: None,
        }
    }

    /// Render the current value of a setting the way users type it.
    pub fn value_of(&self, key: SettingKey) -> String {
        match key {
            SettingKey::DefaultCity => self.default_city.clone(),
            SettingKey::AqiDefaultCity => self.default_aqi_city.clone(),
            SettingKey::Timezone => self.timezone_offset.to_string(),
            SettingKey::ClockChannel => self
                .clock_channel
                .map_or_else(|| "None".to_string(), |id| id.to_string()),
        }
    }

    /// Change a setting from user input and return the previous value.
    ///
    /// Nothing changes when the value can not be parsed.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<String, SettingError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SettingError::EmptyValue(key));
        }

        let old = self.value_of(key);

        match key {
            SettingKey::DefaultCity => self.default_city = value.to_string(),
            SettingKey::AqiDefaultCity => self.default_aqi_city = value.to_string(),
            SettingKey::Timezone => {
                self.timezone_offset = value
                    .parse()
                    .map_err(|_| SettingError::InvalidOffset(value.to_string()))?
            }
            SettingKey::ClockChannel => {
                self.clock_channel = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(lenient::parse_id(value).ok_or_else(|| SettingError::InvalidChannel(value.to_string()))?)
                }
            }
        }

        Ok(old)
    }
}

/// The settings an admin can change.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SettingKey {
    DefaultCity,
    AqiDefaultCity,
    Timezone,
    ClockChannel,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::DefaultCity,
        SettingKey::AqiDefaultCity,
        SettingKey::Timezone,
        SettingKey::ClockChannel,
    ];

    /// Name of the setting, as stored in the settings file.
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::DefaultCity => "defaultCity",
            SettingKey::AqiDefaultCity => "AQI_defaultCity",
            SettingKey::Timezone => "Timezone",
            SettingKey::ClockChannel => "ClockChannel",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("serverID") {
            return Err(SettingError::Immutable);
        }

        SettingKey::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SettingError::UnknownKey(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingError {
    #[error("No one is permitted to alter the server id, as it would compromise bot functionality.")]
    Immutable,
    #[error("Invalid default type '{0}', valid types are defaultCity, AQI_defaultCity, Timezone and ClockChannel.")]
    UnknownKey(String),
    #[error("A new value for {0} is required.")]
    EmptyValue(SettingKey),
    #[error("'{0}' is not a whole number of hours.")]
    InvalidOffset(String),
    #[error("'{0}' is not a channel, use a channel id, a channel mention or 'none'.")]
    InvalidChannel(String),
}
