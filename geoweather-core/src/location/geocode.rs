use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{LocationError, LocationSource, transport_error};
use crate::model::Coordinates;

pub const DEFAULT_GEOCODE_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";

/// Coordinates of a named place ("London,GB") via OpenWeather direct geocoding.
#[derive(Clone)]
pub struct GeocodedLocation {
    place: String,
    api_key: String,
    geocode_url: String,
    http: Client,
}

impl GeocodedLocation {
    pub fn new(place: impl Into<String>, api_key: String) -> Self {
        Self {
            place: place.into(),
            api_key,
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_geocode_url(mut self, geocode_url: impl Into<String>) -> Self {
        self.geocode_url = geocode_url.into();
        self
    }

    pub fn place(&self) -> &str {
        &self.place
    }
}

impl std::fmt::Debug for GeocodedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodedLocation")
            .field("place", &self.place)
            .field("geocode_url", &self.geocode_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct GeoMatch {
    name: Option<String>,
    country: Option<String>,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl LocationSource for GeocodedLocation {
    #[instrument(skip(self), fields(place = %self.place))]
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let res = self
            .http
            .get(&self.geocode_url)
            .query(&[
                ("q", self.place.as_str()),
                ("limit", "1"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LocationError::PermissionDenied(format!(
                "geocoding service refused the request with status {status}"
            )));
        }
        if !status.is_success() {
            return Err(LocationError::PositionUnavailable(format!(
                "geocoding service answered with status {status}"
            )));
        }

        let body = res.text().await.map_err(transport_error)?;
        let matches: Vec<GeoMatch> = serde_json::from_str(&body).map_err(|e| {
            LocationError::PositionUnavailable(format!("malformed geocoding response: {e}"))
        })?;

        let best = matches.into_iter().next().ok_or_else(|| {
            LocationError::PositionUnavailable(format!("no place found for '{}'", self.place))
        })?;

        let coords = Coordinates::new(best.lat, best.lon);
        debug!(%coords, name = ?best.name, country = ?best.country, "place resolved");
        Ok(coords)
    }
}
