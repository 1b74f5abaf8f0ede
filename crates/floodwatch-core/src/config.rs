//! Configuration management for the floodwatch client

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Shared application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Report backend configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Weather feed configuration
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Session persistence configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Report backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the report backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Weather feed configuration
///
/// The weather feed is an independent collaborator: its failure never
/// blocks report polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast endpoint
    #[serde(default = "default_weather_endpoint")]
    pub endpoint: String,

    /// Observation latitude
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Observation longitude
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File the signed-in session is persisted to
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Session lifetime in seconds
    #[serde(default = "default_session_duration")]
    pub session_duration_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_request_timeout() -> u64 {
    10
}

fn default_weather_endpoint() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

// Colombo coordinates
const fn default_latitude() -> f64 {
    6.9271
}

const fn default_longitude() -> f64 {
    79.8612
}

const fn default_session_duration() -> u64 {
    300 // 5 minutes
}

fn default_session_file() -> PathBuf {
    let home_dir = directories::UserDirs::new()
        .map_or_else(|| PathBuf::from("."), |dirs| dirs.home_dir().to_path_buf());
    home_dir.join(".floodwatch").join("session.json")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_weather_endpoint(),
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
            session_duration_seconds: default_session_duration(),
        }
    }
}

impl ApiConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl SessionConfig {
    /// Get session lifetime as Duration
    #[must_use]
    pub const fn session_duration(&self) -> Duration {
        Duration::from_secs(self.session_duration_seconds)
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] if:
    /// - Configuration files contain invalid TOML syntax
    /// - Configuration values are out of valid ranges
    /// - Environment variables have invalid values
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("floodwatch").required(false))
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("FLOODWATCH").separator("_"))
            .build()
            .map_err(|e| crate::Error::configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| crate::Error::configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_functions() {
        assert_eq!(default_base_url(), "http://localhost:8080");
        assert_eq!(default_request_timeout(), 10);
        assert_eq!(
            default_weather_endpoint(),
            "https://api.open-meteo.com/v1/forecast"
        );
        assert!((default_latitude() - 6.9271).abs() < f64::EPSILON);
        assert!((default_longitude() - 79.8612).abs() < f64::EPSILON);
        assert_eq!(default_session_duration(), 300);
    }

    #[test]
    fn test_duration_accessors() {
        let config = AppConfig::default();
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.session.session_duration(), Duration::from_secs(300));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert!(
            config
                .session
                .session_file
                .to_string_lossy()
                .ends_with("session.json")
        );
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = AppConfig::default();

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.api.base_url, deserialized.api.base_url);
        assert_eq!(config.weather.endpoint, deserialized.weather.endpoint);
        assert_eq!(
            config.session.session_duration_seconds,
            deserialized.session.session_duration_seconds
        );
    }

    #[test]
    fn test_partial_config_with_defaults() {
        let minimal_json = r#"{
            "api": {},
            "weather": {},
            "session": {
                "session_file": "/tmp/session.json"
            }
        }"#;

        let config: AppConfig = serde_json::from_str(minimal_json).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.request_timeout_seconds, 10);
        assert_eq!(config.session.session_duration_seconds, 300);
        assert_eq!(config.session.session_file, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn test_partial_toml_config() {
        let toml_src = r#"
            [api]
            base_url = "http://backend:9090"

            [weather]
            latitude = 7.8731
            longitude = 80.7718

            [session]
            session_file = "/var/lib/floodwatch/session.json"
        "#;

        let config: AppConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.api.base_url, "http://backend:9090");
        assert!((config.weather.latitude - 7.8731).abs() < f64::EPSILON);
        assert_eq!(config.session.session_duration_seconds, 300);
    }
}
