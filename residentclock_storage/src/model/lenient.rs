//! Deserializers for settings files written by older versions of the bot.
//!
//! Those wrote ids and offsets entered through admin commands as strings, so every numeric
//! field accepts both json numbers and numeric strings.

use serde::{de::Error, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

/// Parses a Discord id, accepting channel and user mentions (`<#123>`, `<@!123>`).
pub(crate) fn parse_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.trim_start_matches(['#', '@', '!']))
        .unwrap_or(trimmed);

    stripped.parse().ok().filter(|id| *id != 0)
}

pub(crate) fn u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Unsigned(value) => Ok(value),
        NumberOrText::Signed(value) => Err(D::Error::custom(format!("{value} is not a valid id"))),
        NumberOrText::Text(text) => parse_id(&text).ok_or_else(|| D::Error::custom(format!("'{text}' is not a valid id"))),
    }
}

pub(crate) fn i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Unsigned(value) => i64::try_from(value).map_err(D::Error::custom),
        NumberOrText::Signed(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("'{text}' is not a whole number"))),
    }
}

pub(crate) fn option_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Unsigned(value)) => Ok(Some(value)),
        Some(NumberOrText::Signed(value)) => Err(D::Error::custom(format!("{value} is not a valid id"))),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() || text.trim().eq_ignore_ascii_case("none") => Ok(None),
        Some(NumberOrText::Text(text)) => parse_id(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("'{text}' is not a valid id"))),
    }
}
