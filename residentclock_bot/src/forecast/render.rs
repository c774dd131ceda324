//! Embeds for the forecast, temperature and time commands.

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use thiserror::Error;
use tracing::{event, Level};

use crate::embed::{EmbedView, BLANK};
use crate::providers::{Forecast, ForecastEntry};
use crate::timezone::{abbreviation_for_seconds, UnknownOffset};

use super::DaySelector;

const LOGO_URL: &str = "https://cdn.discordapp.com/attachments/800098126693138473/800455530762076180/logo.png";
const ATTRIBUTION: &str = "API Data provided from [Here](https://openweathermap.org/)";
const UNKNOWN_ICON: &str = ":face_with_symbols_over_mouth:";
const KELVIN_OFFSET: f64 = 273.15;
const MIDDAY_HOURS: std::ops::RangeInclusive<u32> = 11..=13;
const DAYLIGHT_HOURS: std::ops::RangeInclusive<u32> = 8..=17;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RenderError {
    #[error("Specified Day out of Range, please try a different day, use `!help forecast` for more information.")]
    DayOutOfRange,
    #[error("Error: the forecast contains a moment that can not be shown.")]
    InvalidTimestamp,
    #[error(transparent)]
    UnknownOffset(#[from] UnknownOffset),
}

/// Build the forecast embed for `day_selector`. `now` decides what "today" is for [DaySelector::CurrentDate].
pub fn forecast(forecast: &Forecast, day_selector: &DaySelector, now: DateTime<Utc>) -> Result<EmbedView, RenderError> {
    match day_selector {
        DaySelector::Days(count) => multi_day(forecast, usize::from(*count)),
        DaySelector::CurrentDate => {
            let today = local_now(now, forecast.city.timezone)?.format("%A").to_string();
            single_day(forecast, &today)
        }
        DaySelector::Weekday(day) => single_day(forecast, day),
    }
}

/// The first entry followed by one around midday of every following day.
fn multi_day(forecast: &Forecast, count: usize) -> Result<EmbedView, RenderError> {
    let offset = forecast.city.timezone;
    let mut view = EmbedView::new(format!("The forecast for the next {count} days in {} is:", forecast.city.name))
        .description(selected_location(forecast))
        .thumbnail(LOGO_URL);

    let mut shown = 0;
    for (index, entry) in forecast.entries.iter().enumerate() {
        if shown == count {
            break;
        }

        let local = entry_time(entry, offset)?;
        if index > 0 && !MIDDAY_HOURS.contains(&local.hour()) {
            continue;
        }

        let title = format!("{}: {}", local.format("%A, %b %-d"), icon_emoji(entry, None));
        view = view.field(title, entry_details(entry), true);
        shown += 1;
    }

    Ok(view.field(BLANK, ATTRIBUTION, false))
}

/// Every entry falling on `weekday`, which is compared to the full weekday name ignoring case.
fn single_day(forecast: &Forecast, weekday: &str) -> Result<EmbedView, RenderError> {
    let offset = forecast.city.timezone;
    let weekday = weekday.to_lowercase();
    let mut view: Option<EmbedView> = None;

    for entry in &forecast.entries {
        let local = entry_time(entry, offset)?;
        if local.format("%A").to_string().to_lowercase() != weekday {
            continue;
        }

        let title = format!("{}: {}", local.format("%-I:%M %p"), icon_emoji(entry, Some(local.hour())));
        let current = view.take().unwrap_or_else(|| {
            EmbedView::new(format!("The forecast for {}, in {} is:", local.format("%A, %b %-d"), forecast.city.name))
                .description(selected_location(forecast))
                .thumbnail(LOGO_URL)
        });
        view = Some(current.field(title, entry_details(entry), true));
    }

    match view {
        Some(view) => Ok(view.field(BLANK, ATTRIBUTION, false)),
        None => {
            event!(Level::DEBUG, %weekday, "No forecast entries for the requested day");
            Err(RenderError::DayOutOfRange)
        }
    }
}

/// Current temperature at the location of `forecast`.
pub fn temperature(forecast: &Forecast) -> Result<EmbedView, RenderError> {
    let entry = forecast.entries.first().ok_or(RenderError::DayOutOfRange)?;

    Ok(EmbedView::new("Today's Temperature is:")
        .description(selected_location(forecast))
        .thumbnail(LOGO_URL)
        .field("Temperature: ", format!("{} °C", celsius(entry.main.temp)), true)
        .field("Feels Like: ", format!("{} °C", celsius(entry.main.feels_like)), true)
        .field(BLANK, ATTRIBUTION, false))
}

/// Wall clock time at the location of `forecast`.
pub fn local_time(forecast: &Forecast, now: DateTime<Utc>) -> Result<EmbedView, RenderError> {
    let offset = forecast.city.timezone;
    let name = abbreviation_for_seconds(offset)?;
    let local = local_now(now, offset)?;

    Ok(EmbedView::new("Current Time:")
        .description(local.format("**%-I:%M:%S %p**\n**%a, %-d/%-m/%Y**").to_string())
        .field("Location: ", format!("{}\n{}", forecast.city.name, forecast.city.country), true)
        .field("Timezone:", format!("{name}\nOffset: {offset}"), true))
}

fn selected_location(forecast: &Forecast) -> String {
    format!("Selected Location: {}, {}", forecast.city.name, forecast.city.country)
}

fn entry_time(entry: &ForecastEntry, offset_seconds: i64) -> Result<NaiveDateTime, RenderError> {
    entry.local_time(offset_seconds).ok_or(RenderError::InvalidTimestamp)
}

fn local_now(now: DateTime<Utc>, offset_seconds: i64) -> Result<NaiveDateTime, RenderError> {
    Duration::try_seconds(offset_seconds)
        .and_then(|offset| now.naive_utc().checked_add_signed(offset))
        .ok_or(RenderError::InvalidTimestamp)
}

fn entry_details(entry: &ForecastEntry) -> String {
    let description = entry.condition().map_or("unknown", |c| c.description.as_str());

    format!(
        "Weather:   {description}\nTemp: {} °C\nFeels like: {} °C",
        celsius(entry.main.temp),
        celsius(entry.main.feels_like)
    )
}

fn celsius(kelvin: f64) -> String {
    format!("{:.2}", kelvin - KELVIN_OFFSET)
}

/// Emoji for the icon code of an entry. With a local `hour`, clear skies follow that hour instead of the icon.
fn icon_emoji(entry: &ForecastEntry, hour: Option<u32>) -> &'static str {
    let Some(icon) = entry.condition().map(|c| c.icon.as_str()) else {
        return UNKNOWN_ICON;
    };

    match (icon, hour) {
        ("01d" | "01n", Some(hour)) if DAYLIGHT_HOURS.contains(&hour) => ":sunny:",
        ("01d" | "01n", Some(_)) => ":new_moon:",
        ("01d", None) => ":sunny:",
        ("01n", None) => ":new_moon:",
        ("02d" | "02n", _) => ":white_sun_small_cloud:",
        ("03d" | "03n", _) => ":white_sun_cloud:",
        ("04d" | "04n", _) => ":cloud:",
        ("09d" | "09n", _) => ":cloud_rain:",
        ("10d" | "10n", _) => ":white_sun_rain_cloud:",
        ("11d" | "11n", _) => ":thunder_cloud_rain:",
        ("13d" | "13n", _) => ":cloud_snow:",
        ("50d" | "50n", _) => ":fog:",
        _ => UNKNOWN_ICON,
    }
}
