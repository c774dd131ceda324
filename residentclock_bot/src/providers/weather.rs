use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{event, instrument, Level};

use super::{endpoint, ProviderError};

const PROVIDER: &str = "OpenWeatherMap";

/// Client for the OpenWeatherMap 5 day / 3 hour forecast.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// A forecast in 3 hour steps.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Forecast {
    #[serde(rename = "list")]
    pub entries: Vec<ForecastEntry>,
    pub city: City,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Offset from UTC in seconds.
    pub timezone: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ForecastEntry {
    /// Unix timestamp of the forecasted moment.
    pub dt: i64,
    pub main: Readings,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

/// Temperatures in Kelvin.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

impl ForecastEntry {
    /// Wall clock time of this entry at a location `offset_seconds` from UTC.
    pub fn local_time(&self, offset_seconds: i64) -> Option<NaiveDateTime> {
        let timestamp = self.dt.checked_add(offset_seconds)?;

        DateTime::from_timestamp(timestamp, 0).map(|t| t.naive_utc())
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into(), api_key: api_key.into() }
    }

    /// Fetch the forecast for `location`, optionally limited to the first `count` entries.
    #[instrument(level = "debug", name = "providers.weather.forecast", skip(self))]
    pub async fn forecast(&self, location: &str, count: Option<u32>) -> Result<Forecast, ProviderError> {
        let mut query = vec![("q", location.to_string()), ("appid", self.api_key.clone())];
        if let Some(count) = count {
            query.push(("cnt", count.to_string()));
        }

        let body: Value = self
            .http
            .get(endpoint(&self.base_url, "data/2.5/forecast"))
            .query(&query)
            .send()
            .await?
            .json()
            .await?;

        if let Some(code) = status_code(&body).filter(|code| code != "200") {
            let message = body["message"].as_str().unwrap_or("Unknown error").to_string();
            event!(Level::DEBUG, %code, %message, "Weather provider reported an error");

            return Err(ProviderError::Status { code, message });
        }

        serde_json::from_value(body).map_err(|e| ProviderError::malformed(PROVIDER, e))
    }
}

/// The `cod` field is a string for some responses and a number for others.
fn status_code(body: &Value) -> Option<String> {
    match &body["cod"] {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    pub(crate) fn entry(dt: i64, kelvin: f64, icon: &str, description: &str) -> Value {
        json!({
            "dt": dt,
            "main": { "temp": kelvin, "feels_like": kelvin - 2.0, "humidity": 80 },
            "weather": [{ "id": 800, "main": "Clear", "description": description, "icon": icon }],
        })
    }

    pub(crate) fn forecast_body(entries: Vec<Value>, timezone: i64) -> Value {
        json!({
            "cod": "200",
            "message": 0,
            "cnt": entries.len(),
            "list": entries,
            "city": { "id": 1, "name": "Paris", "country": "FR", "timezone": timezone },
        })
    }

    #[test]
    fn local_time_applies_offset() {
        let entry: ForecastEntry = serde_json::from_value(entry(1_610_982_000, 280.0, "01d", "clear sky")).unwrap();

        let local = entry.local_time(3600).unwrap();

        assert_eq!(local.to_string(), "2021-01-18 16:00:00");
    }

    #[tokio::test]
    async fn parses_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Paris,FR"))
            .and(query_param("appid", "key"))
            .and(query_param("cnt", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(vec![entry(1_610_982_000, 280.0, "01d", "clear sky")], 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let client = WeatherClient::new(reqwest::Client::new(), server.uri(), "key");
        let forecast = client.forecast("Paris,FR", Some(1)).await.unwrap();

        assert_eq!(forecast.city.name, "Paris");
        assert_eq!(forecast.city.timezone, 3600);
        assert_eq!(forecast.entries.len(), 1);
        assert_eq!(forecast.entries[0].condition().unwrap().icon, "01d");
    }

    #[tokio::test]
    async fn surfaces_provider_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "cod": "404", "message": "city not found" })))
            .mount(&server)
            .await;

        let client = WeatherClient::new(reqwest::Client::new(), server.uri(), "key");
        let error = client.forecast("Atlantis", None).await.unwrap_err();

        assert_eq!(error.to_string(), "Error Code 404 :\ncity not found");
    }

    #[tokio::test]
    async fn numeric_error_codes_are_errors_too() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "cod": 401, "message": "Invalid API key." })))
            .mount(&server)
            .await;

        let client = WeatherClient::new(reqwest::Client::new(), server.uri(), "wrong");
        let error = client.forecast("Paris", None).await.unwrap_err();

        assert!(matches!(error, ProviderError::Status { ref code, .. } if code == "401"));
    }
}
