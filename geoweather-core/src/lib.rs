//! Core library for the `geoweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location sources (fixed coordinates, IP lookup)
//! - The OpenWeather current-weather client
//! - The fetch flow and the sinks its outcome is reported to
//!
//! It is used by `geoweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod fetcher;
pub mod location;
pub mod model;
pub mod provider;
pub mod report;
pub mod summary;

pub use config::{Config, LocationConfig, OpenWeatherConfig};
pub use fetcher::{FetchError, WeatherFetcher};
pub use location::{LocationError, LocationSource, location_from_config};
pub use model::Coordinates;
pub use provider::{OpenWeatherClient, WeatherError, WeatherSource, source_from_config};
pub use report::{ReportSink, TracingSink};
pub use summary::CurrentConditions;
