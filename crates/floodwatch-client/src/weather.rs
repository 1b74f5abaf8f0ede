//! Current-conditions client for the Open-Meteo forecast feed
//!
//! The weather panel is decorative context next to the incident map, so
//! this client degrades instead of failing: callers that want a snapshot
//! no matter what use [`WeatherClient::fetch_or_unavailable`].

use floodwatch_core::{Error, Result, WeatherConfig};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// A point-in-time weather observation for the monitored area
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Air temperature in degrees Celsius, rounded
    pub temperature: i32,

    /// Human-readable condition label
    pub condition: String,

    /// Relative humidity in percent
    pub humidity: f64,

    /// Wind speed in km/h, rounded
    pub wind_speed: i32,

    /// Rainfall in mm
    pub rainfall: f64,
}

impl WeatherSnapshot {
    /// Placeholder snapshot used when the feed cannot be reached
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            temperature: 0,
            condition: "Unavailable".to_string(),
            humidity: 0.0,
            wind_speed: 0,
            rainfall: 0.0,
        }
    }
}

/// Map a WMO weather code to its display label
#[must_use]
pub const fn condition_label(code: u32) -> &'static str {
    match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        61 => "Slight Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        95 => "Thunderstorm",
        _ => "Unknown",
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    rain: f64,
    wind_speed_10m: f64,
    weather_code: u32,
}

/// Client for the weather feed
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    config: WeatherConfig,
}

impl WeatherClient {
    /// Create a new client for the configured observation point
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: WeatherConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Fetch the current conditions
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the request fails, [`Error::Api`] on a
    /// non-success status, or [`Error::Decode`] if the body cannot be
    /// parsed.
    pub async fn fetch_current(&self) -> Result<WeatherSnapshot> {
        let url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,rain,wind_speed_10m,weather_code&timezone=auto",
            self.config.endpoint, self.config.latitude, self.config.longitude
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::http(format!("failed to fetch weather: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), "failed to fetch weather"));
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| Error::decode(format!("failed to parse weather: {e}")))?;

        #[allow(clippy::cast_possible_truncation)]
        let snapshot = WeatherSnapshot {
            temperature: forecast.current.temperature_2m.round() as i32,
            condition: condition_label(forecast.current.weather_code).to_string(),
            humidity: forecast.current.relative_humidity_2m,
            wind_speed: forecast.current.wind_speed_10m.round() as i32,
            rainfall: forecast.current.rain,
        };

        Ok(snapshot)
    }

    /// Fetch the current conditions, degrading to a placeholder on any
    /// failure
    pub async fn fetch_or_unavailable(&self) -> WeatherSnapshot {
        match self.fetch_current().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(%error, "weather feed unavailable");
                WeatherSnapshot::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> WeatherConfig {
        WeatherConfig {
            endpoint: format!("{}/v1/forecast", server.uri()),
            latitude: 6.9271,
            longitude: 79.8612,
        }
    }

    fn current_body(code: u32) -> serde_json::Value {
        serde_json::json!({
            "current": {
                "temperature_2m": 28.6,
                "relative_humidity_2m": 84.0,
                "rain": 1.2,
                "wind_speed_10m": 14.4,
                "weather_code": code,
            }
        })
    }

    #[test]
    fn test_condition_labels() {
        assert_eq!(condition_label(0), "Clear Sky");
        assert_eq!(condition_label(2), "Partly Cloudy");
        assert_eq!(condition_label(63), "Moderate Rain");
        assert_eq!(condition_label(95), "Thunderstorm");
        assert_eq!(condition_label(42), "Unknown");
    }

    #[tokio::test]
    async fn test_fetch_current_rounds_and_maps() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "6.9271"))
            .and(query_param("longitude", "79.8612"))
            .and(query_param(
                "current",
                "temperature_2m,relative_humidity_2m,rain,wind_speed_10m,weather_code",
            ))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(61)))
            .mount(&server)
            .await;

        let client = WeatherClient::new(config_for(&server), Duration::from_secs(5)).unwrap();
        let snapshot = client.fetch_current().await.unwrap();

        assert_eq!(snapshot.temperature, 29);
        assert_eq!(snapshot.condition, "Slight Rain");
        assert!((snapshot.humidity - 84.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.wind_speed, 14);
        assert!((snapshot.rainfall - 1.2).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unknown_code_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(77)))
            .mount(&server)
            .await;

        let client = WeatherClient::new(config_for(&server), Duration::from_secs(5)).unwrap();
        let snapshot = client.fetch_current().await.unwrap();
        assert_eq!(snapshot.condition, "Unknown");
    }

    #[tokio::test]
    async fn test_fetch_or_unavailable_degrades() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = WeatherClient::new(config_for(&server), Duration::from_secs(5)).unwrap();
        let snapshot = client.fetch_or_unavailable().await;
        assert_eq!(snapshot, WeatherSnapshot::unavailable());
        assert_eq!(snapshot.condition, "Unavailable");
    }
}
