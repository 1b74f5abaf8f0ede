//! Core types and utilities for the floodwatch monitoring client

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use config::{ApiConfig, AppConfig, SessionConfig, WeatherConfig};
pub use error::{Error, Result};
pub use session::{Session, SessionStore, User, UserRole};
pub use types::{
    Criticality, FilterSelection, IncidentCategory, NewReport, Report, ReportId, ReportStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_are_usable() {
        let filter = FilterSelection::all();
        assert!(filter.district.is_none());

        let err: Error = Error::http("down");
        assert!(err.to_string().contains("down"));
    }
}
