//! Configuration for the floodwatch monitor service

use floodwatch_core::AppConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main monitor service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Shared application configuration (backend, weather, session)
    #[serde(default)]
    pub app: AppConfig,

    /// Polling configuration
    #[serde(default)]
    pub poll: PollConfig,

    /// Notification queue configuration
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between poll ticks
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

/// Notification queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Seconds a notification lives before auto-expiry
    #[serde(default = "default_notification_ttl")]
    pub ttl_seconds: u64,

    /// Number of most recent notifications shown
    #[serde(default = "default_visible_limit")]
    pub visible_limit: usize,

    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging and identification
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

const fn default_poll_interval() -> u64 {
    30
}

const fn default_notification_ttl() -> u64 {
    20
}

const fn default_visible_limit() -> usize {
    3
}

const fn default_sweep_interval() -> u64 {
    1
}

fn default_service_name() -> String {
    "floodwatch-monitor".to_string()
}

const fn default_shutdown_timeout() -> u64 {
    30
}

impl PollConfig {
    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl NotificationConfig {
    /// Get notification TTL as Duration
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Get sweep interval as Duration
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl ServiceConfig {
    /// Get shutdown timeout as Duration
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_notification_ttl(),
            visible_limit: default_visible_limit(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from files and environment
    ///
    /// # Errors
    ///
    /// Returns [`floodwatch_core::Error::Configuration`] if configuration
    /// sources cannot be read or deserialized.
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("floodwatch").required(false))
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("FLOODWATCH").separator("_"))
            .build()
            .map_err(|e| floodwatch_core::Error::configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| floodwatch_core::Error::configuration(e.to_string()))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns [`floodwatch_core::Error::Configuration`] if any value is
    /// outside its valid range.
    pub fn validate(&self) -> crate::Result<()> {
        if self.poll.poll_interval_seconds == 0 {
            return Err(floodwatch_core::Error::configuration(
                "poll_interval_seconds must be greater than zero",
            ));
        }
        if self.notifications.ttl_seconds == 0 {
            return Err(floodwatch_core::Error::configuration(
                "notification ttl_seconds must be greater than zero",
            ));
        }
        if self.notifications.visible_limit == 0 {
            return Err(floodwatch_core::Error::configuration(
                "visible_limit must be greater than zero",
            ));
        }
        if self.app.api.base_url.is_empty() {
            return Err(floodwatch_core::Error::configuration(
                "api base_url must not be empty",
            ));
        }
        Ok(())
    }
}
