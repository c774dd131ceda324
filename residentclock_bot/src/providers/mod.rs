//! Clients for the third-party data providers.

use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

pub mod air_quality;
pub mod images;
pub mod levels;
pub mod weather;

pub use air_quality::{AirQuality, AirQualityClient, AqiLevel};
pub use images::{Animal, ImageClient};
pub use levels::LevelsClient;
pub use weather::{Forecast, ForecastEntry, WeatherClient};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors a provider can report. The messages are shown to users as they are.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error code of its own.
    #[error("Error Code {code} :\n{message}")]
    Status { code: String, message: String },
    #[error("Error: Location returned no result.")]
    NoResult,
    #[error("Error: {provider} sent a response I don't understand ({reason}).")]
    Malformed { provider: &'static str, reason: String },
    #[error("Error: could not reach the provider ({0}).")]
    Http(#[from] reqwest::Error),
    #[error("Error: the provider url {0} is not usable.")]
    BaseUrl(String),
}

impl ProviderError {
    pub(crate) fn malformed(provider: &'static str, reason: impl ToString) -> Self {
        Self::Malformed { provider, reason: reason.to_string() }
    }
}

/// Shared http client for all providers.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("residentclock/", env!("CARGO_PKG_VERSION")))
        .build()
        .with_context(|| "Error building the http client")
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// `base_url` followed by `segments`, each percent-encoded as a single path segment.
pub(crate) fn segment_endpoint(base_url: &str, segments: &[&str]) -> Result<reqwest::Url, ProviderError> {
    let mut url = reqwest::Url::parse(base_url).map_err(|_| ProviderError::BaseUrl(base_url.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::BaseUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_slashes_once() {
        assert_eq!(endpoint("http://localhost:1234/", "/data/2.5/forecast"), "http://localhost:1234/data/2.5/forecast");
        assert_eq!(endpoint("https://api.waqi.info", "feed/Victoria/"), "https://api.waqi.info/feed/Victoria/");
    }

    #[test]
    fn segments_are_escaped() {
        let url = segment_endpoint("https://api.waqi.info/", &["feed", "Delhi/NCR?x#y", ""]).unwrap();

        assert_eq!(url.as_str(), "https://api.waqi.info/feed/Delhi%2FNCR%3Fx%23y/");
    }

    #[test]
    fn unusable_base_url_is_an_error() {
        assert!(matches!(segment_endpoint("not a url", &["feed"]), Err(ProviderError::BaseUrl(_))));
    }
}
