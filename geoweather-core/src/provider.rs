use crate::{Config, config::API_KEY_ENV, model::Coordinates};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Weather request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Current weather for a position, as the service's own JSON document.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current_weather(&self, coords: Coordinates) -> Result<Value, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `geoweather configure` or set {API_KEY_ENV}."
        )
    })?;

    let client = OpenWeatherClient::new(api_key);
    Ok(match &config.openweather.base_url {
        Some(url) => client.with_base_url(url),
        None => client,
    })
}
