//! Fixed hour-offset timezone names and the clocktower channel name.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// One name per whole hour offset from UTC-12 to UTC+12.
///
/// UTC-6 and UTC+8 are both "CST". Existing servers show these names, keep them as they are.
const ABBREVIATIONS: [&str; 25] = [
    "IDLW", "NT", "HST", "AKST", "PST", "PDT", "CST", "EST", "AST", "ART", "AT", "WAT",
    "GMT",
    "CET", "EET", "MSK", "AMT", "PKT", "OMSK", "KRAT", "CST", "JST", "AEST", "SAKT", "NZST",
];

const MAX_OFFSET_HOURS: i64 = 12;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("There is no timezone name for an offset of {offset_hours:+} hours, use a whole number between -12 and 12.")]
pub struct UnknownOffset {
    pub offset_hours: i64,
}

/// Name of the timezone `offset_hours` whole hours from UTC.
pub fn abbreviation(offset_hours: i64) -> Result<&'static str, UnknownOffset> {
    if !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&offset_hours) {
        return Err(UnknownOffset { offset_hours });
    }

    Ok(ABBREVIATIONS[(offset_hours + MAX_OFFSET_HOURS) as usize])
}

/// Like [abbreviation] for offsets in seconds, as reported by the weather provider.
///
/// Offsets that are not whole hours are truncated towards zero, so UTC+5:30 is named like UTC+5.
pub fn abbreviation_for_seconds(offset_seconds: i64) -> Result<&'static str, UnknownOffset> {
    abbreviation(offset_seconds / 3600)
}

/// Channel name showing the time at `offset_hours` from `now`, e.g. `Time: 3:05 PM, Mon (GMT)`.
pub fn clock_channel_name(now: DateTime<Utc>, offset_hours: i64) -> Result<String, UnknownOffset> {
    let name = abbreviation(offset_hours)?;
    let local = now.naive_utc() + Duration::hours(offset_hours);

    Ok(format!("Time: {} ({name})", local.format("%-I:%M %p, %a")))
}
