//! HTTP clients for the floodwatch monitoring client
//!
//! Two independent collaborators live here: [`reports::ReportsClient`]
//! talks to the incident backend, and [`weather::WeatherClient`] talks to
//! the Open-Meteo feed. Weather failures never affect report polling.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod reports;
pub mod weather;

pub use reports::ReportsClient;
pub use weather::{WeatherClient, WeatherSnapshot, condition_label};
