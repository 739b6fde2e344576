//! Core library for the `airq` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Place resolution and pollution/weather fetching against OpenWeather
//! - AQI conversion from pollutant concentrations
//! - Device location acquisition with a fallback attempt
//!
//! The core is stateless: callers own session state and pass a
//! [`CancellationToken`] into every network call.

pub mod aqi;
pub mod client;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod pollutant;
pub mod transport;

pub use aqi::{AqiCategory, AqiResult, approximate_from_index, to_aqi};
pub use client::AirQualityClient;
pub use config::{Config, Locale};
pub use error::AirQualityError;
pub use geolocation::{FixFileSource, LocationSource, PositionOptions, device_location};
pub use model::{
    CHART_WINDOW, Components, Conditions, Coordinates, PlaceInfo, PollutionReading,
    PollutionSeries, WeatherReading,
};
pub use pollutant::{Pollutant, PollutantGroup};
pub use tokio_util::sync::CancellationToken;
