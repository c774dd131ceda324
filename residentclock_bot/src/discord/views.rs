//! Embeds that don't depend on the weather forecast.

use residentclock_storage::prelude::SettingKey;

use crate::embed::{EmbedView, BLANK, SUCCESS_COLOUR};
use crate::moon::MoonPhase;
use crate::providers::{AirQuality, AqiLevel};

const AQI_ATTRIBUTION: &str = "API Data provided from [Here](https://aqicn.org/)";
const INVITE_THUMBNAIL: &str = "https://cdn.discordapp.com/attachments/800098126693138473/800164667489124372/big_funi.png";
/// Permission bits requested by the invite link.
const INVITE_PERMISSIONS: u64 = 126016;

fn air_quality(location: &str, quality: &AirQuality) -> EmbedView {
    EmbedView::new(format!("{} Air Quality Index", capitalize(location)))
        .description(format!("Selected Location: {}", quality.station))
        .field("Rating: ", quality.index.to_string(), false)
        .field("Status:", AqiLevel::from_index(quality.index).label(), false)
}

pub fn air_quality_summary(location: &str, quality: &AirQuality) -> EmbedView {
    air_quality(location, quality).field(BLANK, AQI_ATTRIBUTION, false)
}

pub fn air_quality_detailed(location: &str, quality: &AirQuality) -> EmbedView {
    let p = &quality.pollutants;

    air_quality(location, quality)
        .field("O3 Level:", concentration(p.o3), true)
        .field("NO2 Level:", concentration(p.no2), true)
        .field("Fine Particulate Matter (PM2.5) Level:", concentration(p.pm25), false)
        .field("SO2 Level:", concentration(p.so2), true)
        .field("CO Level:", concentration(p.co), true)
        .field(BLANK, AQI_ATTRIBUTION, false)
}

fn concentration(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v} μg/m3"))
}

pub fn moon(position: f64) -> EmbedView {
    let phase = MoonPhase::from_position(position);

    EmbedView::new("Current Moon Phase").field(
        format!("{} {}", phase.emoji(), phase.name()),
        format!("position: {position:.3}"),
        false,
    )
}

pub fn invite(bot_id: u64) -> EmbedView {
    EmbedView::new("Invite me to another server!")
        .description(format!(
            "invite me using this [link!](https://discord.com/api/oauth2/authorize?client_id={bot_id}&permissions={INVITE_PERMISSIONS}&scope=bot)"
        ))
        .thumbnail(INVITE_THUMBNAIL)
}

pub fn setting_changed(key: SettingKey, old: &str, new: &str) -> EmbedView {
    EmbedView::new("Default Value Altered:")
        .description(format!("**{key}**\nOld: {old}\nNew: {new}"))
        .colour(SUCCESS_COLOUR)
}

pub fn clocktower_added(channel: &str, offset: i64) -> EmbedView {
    EmbedView::new("Added Clock Tower:")
        .description(format!("{channel}, {offset}"))
        .colour(SUCCESS_COLOUR)
}

pub fn quote_added(quote: &str) -> EmbedView {
    EmbedView::new("Quote added:").description(quote).colour(SUCCESS_COLOUR)
}

pub fn server_list<'a>(names: impl IntoIterator<Item = &'a str>) -> EmbedView {
    let description: String = names.into_iter().map(|name| format!("{name}\n")).collect();

    EmbedView::new("Here is a list of all servers that I am a member of:").description(description)
}

/// Uppercase the first letter and lowercase the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
