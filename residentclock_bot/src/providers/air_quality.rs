use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{event, instrument, Level};

use super::{segment_endpoint, ProviderError};

const PROVIDER: &str = "WAQI";

/// Client for the World Air Quality Index feed.
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Current air quality at a monitoring station.
#[derive(Debug, Clone, PartialEq)]
pub struct AirQuality {
    pub index: i64,
    /// Name of the station that measured the values.
    pub station: String,
    pub pollutants: Pollutants,
}

/// Individual pollutant readings. Stations don't measure everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pollutants {
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub pm25: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
}

/// US EPA health categories for an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiLevel {
    pub fn from_index(index: i64) -> Self {
        match index {
            i64::MIN..=50 => AqiLevel::Good,
            51..=100 => AqiLevel::Moderate,
            101..=150 => AqiLevel::UnhealthyForSensitiveGroups,
            151..=200 => AqiLevel::Unhealthy,
            201..=300 => AqiLevel::VeryUnhealthy,
            _ => AqiLevel::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiLevel::Unhealthy => "Unhealthy",
            AqiLevel::VeryUnhealthy => "Very Unhealthy",
            AqiLevel::Hazardous => "Hazardous",
        }
    }
}

#[derive(Deserialize)]
struct FeedData {
    aqi: Value,
    city: Station,
    #[serde(default)]
    iaqi: HashMap<String, Reading>,
}

#[derive(Deserialize)]
struct Station {
    name: String,
}

#[derive(Deserialize)]
struct Reading {
    v: f64,
}

impl AirQualityClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into(), token: token.into() }
    }

    #[instrument(level = "debug", name = "providers.air_quality.feed", skip(self))]
    pub async fn feed(&self, location: &str) -> Result<AirQuality, ProviderError> {
        let url = segment_endpoint(&self.base_url, &["feed", location, ""])?;
        let body: Value = self
            .http
            .get(url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await?
            .json()
            .await?;

        if body["status"] != "ok" {
            event!(Level::DEBUG, response = %body["data"], "Air quality provider has no result");
            return Err(ProviderError::NoResult);
        }

        let data: FeedData = serde_json::from_value(body["data"].clone())
            .map_err(|e| ProviderError::malformed(PROVIDER, e))?;

        // Stations without a current reading report "-".
        let index = match &data.aqi {
            Value::Number(n) => n.as_f64().map(|f| f.round() as i64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or(ProviderError::NoResult)?;

        let reading = |key: &str| data.iaqi.get(key).map(|r| r.v);
        let pollutants = Pollutants {
            o3: reading("o3"),
            no2: reading("no2"),
            pm25: reading("pm25"),
            so2: reading("so2"),
            co: reading("co"),
        };

        Ok(AirQuality { index, station: data.city.name, pollutants })
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[rstest]
    #[case(0, AqiLevel::Good)]
    #[case(50, AqiLevel::Good)]
    #[case(51, AqiLevel::Moderate)]
    #[case(100, AqiLevel::Moderate)]
    #[case(150, AqiLevel::UnhealthyForSensitiveGroups)]
    #[case(200, AqiLevel::Unhealthy)]
    #[case(300, AqiLevel::VeryUnhealthy)]
    #[case(301, AqiLevel::Hazardous)]
    #[case(999, AqiLevel::Hazardous)]
    fn classifies_index(#[case] index: i64, #[case] expected: AqiLevel) {
        assert_eq!(AqiLevel::from_index(index), expected);
    }

    async fn server_with(body: Value) -> MockServer {
        server_at("/feed/Victoria/", body).await
    }

    async fn server_at(feed_path: &str, body: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(feed_path))
            .and(query_param("token", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn parses_feed() {
        let server = server_with(json!({
            "status": "ok",
            "data": {
                "aqi": 42,
                "city": { "name": "Victoria Topaz, British Columbia, Canada" },
                "iaqi": { "o3": { "v": 21.4 }, "pm25": { "v": 42 }, "no2": { "v": 3.1 } }
            }
        }))
        .await;

        let client = AirQualityClient::new(reqwest::Client::new(), server.uri(), "token");
        let quality = client.feed("Victoria").await.unwrap();

        assert_eq!(quality.index, 42);
        assert_eq!(quality.station, "Victoria Topaz, British Columbia, Canada");
        assert_eq!(quality.pollutants, Pollutants { o3: Some(21.4), no2: Some(3.1), pm25: Some(42.0), so2: None, co: None });
    }

    #[tokio::test]
    async fn error_status_means_no_result() {
        let server = server_with(json!({ "status": "error", "data": "Unknown station" })).await;

        let client = AirQualityClient::new(reqwest::Client::new(), server.uri(), "token");
        let error = client.feed("Victoria").await.unwrap_err();

        assert!(matches!(error, ProviderError::NoResult));
        assert_eq!(error.to_string(), "Error: Location returned no result.");
    }

    #[tokio::test]
    async fn station_without_reading_means_no_result() {
        let server = server_with(json!({
            "status": "ok",
            "data": { "aqi": "-", "city": { "name": "Somewhere" } }
        }))
        .await;

        let client = AirQualityClient::new(reqwest::Client::new(), server.uri(), "token");

        assert!(matches!(client.feed("Victoria").await, Err(ProviderError::NoResult)));
    }

    #[tokio::test]
    async fn location_stays_in_its_path_segment() {
        let server = server_at(
            "/feed/Delhi%2FNCR%3Fcity=1/",
            json!({ "status": "ok", "data": { "aqi": 180, "city": { "name": "Anand Vihar, Delhi" } } }),
        )
        .await;

        let client = AirQualityClient::new(reqwest::Client::new(), server.uri(), "token");
        let quality = client.feed("Delhi/NCR?city=1").await.unwrap();

        assert_eq!(quality.index, 180);
    }
}
