//! Incident feed aggregation and notification engine for floodwatch
//!
//! Polls the report backend on a fixed cadence, maintains all-time and
//! active report views, derives filtered sets, statistics and chart
//! series, detects newly-arrived critical incidents, and manages a
//! TTL-bounded notification queue. Designed to degrade to stale-but-
//! visible data rather than fail closed.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod charts;
pub mod config;
pub mod export;
pub mod filter;
pub mod notify;
pub mod service;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use config::{MonitorConfig, NotificationConfig, PollConfig, ServiceConfig};
pub use floodwatch_core::{Error, Result};
pub use notify::{Notification, NotificationKind, NotificationQueue};
pub use service::{MonitorService, PollState, ServiceStatus};
pub use stats::Stats;
pub use store::{ReportStore, StoreEvent};

/// Initialize the monitoring service with default configuration
///
/// # Errors
///
/// Returns an error if configuration loading or validation fails, or an
/// HTTP client cannot be constructed.
pub fn init() -> Result<MonitorService> {
    let config = MonitorConfig::load()?;
    MonitorService::new(config)
}

/// Initialize the monitoring service with custom configuration
///
/// # Errors
///
/// Returns an error if validation fails or an HTTP client cannot be
/// constructed.
pub fn init_with_config(config: MonitorConfig) -> Result<MonitorService> {
    MonitorService::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_exports() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll.poll_interval_seconds, 30);

        let error = Error::configuration("test");
        assert!(error.to_string().contains("test"));

        let status = ServiceStatus::default();
        assert_eq!(status, ServiceStatus::Stopped);
    }

    #[test]
    fn test_init_with_default_config() {
        let service = init_with_config(MonitorConfig::default()).unwrap();
        assert_eq!(service.status(), ServiceStatus::Stopped);
    }
}
