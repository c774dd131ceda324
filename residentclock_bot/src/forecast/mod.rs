//! Turning the free-text arguments of the forecast command into a location and the day(s) to show.

use residentclock_storage::prelude::ServerConfig;
use thiserror::Error;

pub mod render;

/// Longest span the multi-day forecast covers.
pub const MAX_DAYS: u8 = 5;

const WEEKDAYS: [&str; 7] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

/// Which day(s) of the forecast to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySelector {
    /// Today, in the timezone of the requested location.
    CurrentDate,
    /// The text the user gave for a weekday. It is matched against the full weekday name when rendering.
    Weekday(String),
    /// A running span of days, always within `1..=MAX_DAYS`.
    Days(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    SingleDay,
    MultiDay,
}

/// A resolved forecast command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    /// Location to query, without spaces.
    pub location: String,
    pub day_selector: DaySelector,
}

impl ForecastRequest {
    fn single(location: &str, day_selector: DaySelector) -> Self {
        Self { location: strip_spaces(location), day_selector }
    }

    fn days(location: &str, count: u8) -> Self {
        Self { location: strip_spaces(location), day_selector: DaySelector::Days(count) }
    }

    pub fn mode(&self) -> ForecastMode {
        match self.day_selector {
            DaySelector::Days(_) => ForecastMode::MultiDay,
            _ => ForecastMode::SingleDay,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResolveError {
    #[error("Error, you must provide either a day of the week or a number of days, but not *both*, use `!help forecast` for more information.")]
    ConflictingSelectors,
    #[error("'{0}' is neither a location, a day of the week nor a number of days, use `!help forecast` for more information.")]
    InvalidDayCount(String),
}

/// Classify the (up to two) arguments of the forecast command.
///
/// Rules, the first one that matches wins:
/// 1. No arguments: today at the server's default city.
/// 2. One argument:
///    a. mentions a weekday: that weekday at the default city;
///    b. longer than one character: today at that location;
///    c. `1`: today at the default city;
///    d. otherwise a number of days at the default city.
/// 3. Two arguments:
///    a. a number together with a weekday is rejected;
///    b. first is a number: `1` means today, anything else a number of days, at the second argument;
///    c. second is a number: the same, with the roles swapped;
///    d. first mentions a weekday: that weekday at the second argument;
///    e. otherwise the second argument is taken as the weekday and the first as the location.
///
/// Rule 3e does not check that the second argument actually names a weekday. Two plain words
/// end up as a weekday nobody will find in the forecast.
pub fn resolve(arg1: Option<&str>, arg2: Option<&str>, defaults: &ServerConfig) -> Result<ForecastRequest, ResolveError> {
    let default_city = defaults.default_city.as_str();

    match (arg1, arg2) {
        (None, None) => Ok(ForecastRequest::single(default_city, DaySelector::CurrentDate)),
        (Some(arg), None) | (None, Some(arg)) => resolve_one(arg, default_city),
        (Some(first), Some(second)) => resolve_two(first, second),
    }
}

fn resolve_one(arg: &str, default_city: &str) -> Result<ForecastRequest, ResolveError> {
    if mentions_weekday(arg) {
        return Ok(ForecastRequest::single(default_city, weekday(arg)));
    }

    if arg.chars().count() > 1 {
        return Ok(ForecastRequest::single(arg, DaySelector::CurrentDate));
    }

    if arg == "1" {
        return Ok(ForecastRequest::single(default_city, DaySelector::CurrentDate));
    }

    if is_numeric(arg) {
        return Ok(ForecastRequest::days(default_city, day_count(arg)));
    }

    Err(ResolveError::InvalidDayCount(arg.to_string()))
}

fn resolve_two(first: &str, second: &str) -> Result<ForecastRequest, ResolveError> {
    if (is_numeric(first) && mentions_weekday(second)) || (is_numeric(second) && mentions_weekday(first)) {
        return Err(ResolveError::ConflictingSelectors);
    }

    if is_numeric(first) {
        return Ok(count_at(first, second));
    }

    if is_numeric(second) {
        return Ok(count_at(second, first));
    }

    if mentions_weekday(first) {
        return Ok(ForecastRequest::single(second, weekday(first)));
    }

    Ok(ForecastRequest::single(first, weekday(second)))
}

/// `count` is known to be numeric.
fn count_at(count: &str, location: &str) -> ForecastRequest {
    if is_one(count) {
        ForecastRequest::single(location, DaySelector::CurrentDate)
    } else {
        ForecastRequest::days(location, day_count(count))
    }
}

fn weekday(arg: &str) -> DaySelector {
    DaySelector::Weekday(strip_spaces(arg))
}

fn mentions_weekday(arg: &str) -> bool {
    let lower = arg.to_lowercase();

    WEEKDAYS.iter().any(|day| lower.contains(day))
}

fn is_numeric(arg: &str) -> bool {
    !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit())
}

fn is_one(arg: &str) -> bool {
    arg.parse::<u64>().is_ok_and(|n| n == 1)
}

/// Clamped to `1..=MAX_DAYS`. Numbers too large to parse count as the maximum.
fn day_count(arg: &str) -> u8 {
    arg.parse::<u64>()
        .map_or(MAX_DAYS, |n| n.clamp(1, u64::from(MAX_DAYS)) as u8)
}

/// Provider queries don't like spaces, e.g. `Paris, FR` becomes `Paris,FR`.
fn strip_spaces(s: &str) -> String {
    s.replace(' ', "")
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[fixture]
    fn defaults() -> ServerConfig {
        let mut config = ServerConfig::new(1);
        config.default_city = "Victoria, CA".into();
        config
    }

    fn today(location: &str) -> ForecastRequest {
        ForecastRequest { location: location.into(), day_selector: DaySelector::CurrentDate }
    }

    fn on(location: &str, day: &str) -> ForecastRequest {
        ForecastRequest { location: location.into(), day_selector: DaySelector::Weekday(day.into()) }
    }

    fn days(location: &str, count: u8) -> ForecastRequest {
        ForecastRequest { location: location.into(), day_selector: DaySelector::Days(count) }
    }

    #[rstest]
    fn no_arguments_is_today_at_default(defaults: ServerConfig) {
        let request = resolve(None, None, &defaults).unwrap();

        assert_eq!(request, today("Victoria,CA"));
        assert_eq!(request.mode(), ForecastMode::SingleDay);
    }

    #[rstest]
    #[case("Monday", on("Victoria,CA", "Monday"))]
    #[case("FRIDAY", on("Victoria,CA", "FRIDAY"))]
    #[case("nextsunday", on("Victoria,CA", "nextsunday"))]
    #[case("Paris", today("Paris"))]
    #[case("New York", today("NewYork"))]
    #[case("10", today("10"))]
    #[case("1", today("Victoria,CA"))]
    #[case("5", days("Victoria,CA", 5))]
    #[case("3", days("Victoria,CA", 3))]
    #[case("9", days("Victoria,CA", 5))]
    #[case("0", days("Victoria,CA", 1))]
    fn one_argument(defaults: ServerConfig, #[case] arg: &str, #[case] expected: ForecastRequest) {
        assert_eq!(resolve(Some(arg), None, &defaults), Ok(expected));
    }

    #[rstest]
    fn single_non_digit_character_is_rejected(defaults: ServerConfig) {
        assert_eq!(resolve(Some("x"), None, &defaults), Err(ResolveError::InvalidDayCount("x".into())));
    }

    #[rstest]
    fn only_second_argument_acts_like_first(defaults: ServerConfig) {
        assert_eq!(resolve(None, Some("4"), &defaults), resolve(Some("4"), None, &defaults));
    }

    #[rstest]
    #[case("Monday", "Paris", on("Paris", "Monday"))]
    #[case("Paris", "Monday", on("Paris", "Monday"))]
    #[case("3", "Paris", days("Paris", 3))]
    #[case("Paris", "3", days("Paris", 3))]
    #[case("1", "Paris", today("Paris"))]
    #[case("Paris", "01", today("Paris"))]
    #[case("12", "Paris", days("Paris", 5))]
    #[case("Paris", "0", days("Paris", 1))]
    #[case("99999999999999999999999", "Oslo", days("Oslo", 5))]
    #[case("3", "4", days("4", 3))]
    #[case("New York", "friday", on("NewYork", "friday"))]
    fn two_arguments(defaults: ServerConfig, #[case] first: &str, #[case] second: &str, #[case] expected: ForecastRequest) {
        assert_eq!(resolve(Some(first), Some(second), &defaults), Ok(expected));
    }

    #[rstest]
    #[case("3", "Monday")]
    #[case("Monday", "3")]
    #[case("1", "next tuesday")]
    fn number_and_weekday_conflict(defaults: ServerConfig, #[case] first: &str, #[case] second: &str) {
        assert_eq!(resolve(Some(first), Some(second), &defaults), Err(ResolveError::ConflictingSelectors));
    }

    #[rstest]
    fn two_plain_words_take_the_second_as_weekday(defaults: ServerConfig) {
        let request = resolve(Some("Paris"), Some("London"), &defaults).unwrap();

        assert_eq!(request, on("Paris", "London"));
    }

    #[rstest]
    fn multi_day_mode(defaults: ServerConfig) {
        let request = resolve(Some("2"), None, &defaults).unwrap();

        assert_eq!(request.mode(), ForecastMode::MultiDay);
    }
}
