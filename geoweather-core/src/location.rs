use crate::{Config, config::API_KEY_ENV, model::Coordinates};
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::debug;

pub mod geocode;
pub mod ip;

pub use geocode::GeocodedLocation;
pub use ip::IpLocation;

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied: {0}")]
    PermissionDenied(String),
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
    #[error("Location request timed out")]
    Timeout,
}

// reqwest errors embed the request URL, which may carry an API key.
pub(crate) fn transport_error(err: reqwest::Error) -> LocationError {
    if err.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::PositionUnavailable(err.without_url().to_string())
    }
}

/// Something that can tell where this machine is.
///
/// No timeout is applied by callers; an implementation that never resolves
/// leaves the fetch pending.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

#[async_trait]
impl<T: LocationSource + ?Sized> LocationSource for Box<T> {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        (**self).current_position().await
    }
}

/// Coordinates supplied up front by the user.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Refuses every request, standing in for a user who declined location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocation;

#[async_trait]
impl LocationSource for DeniedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied(
            "automatic location lookup is disabled".to_string(),
        ))
    }
}

/// Pick a location source.
///
/// Precedence: explicit coordinates, then a named place, then fixed
/// coordinates from config, then an IP lookup unless lookups are disabled (in
/// config or by `allow_lookup`). Geocoding a place needs the OpenWeather key.
pub fn location_from_config(
    config: &Config,
    explicit: Option<Coordinates>,
    place: Option<&str>,
    allow_lookup: bool,
) -> anyhow::Result<Box<dyn LocationSource>> {
    if let Some(coords) = explicit {
        debug!(%coords, "using explicit coordinates");
        return Ok(Box::new(FixedLocation(coords)));
    }

    if let Some(place) = place {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "Looking up '{place}' needs an OpenWeather API key.\n\
                 Hint: run `geoweather configure` or set {API_KEY_ENV}."
            )
        })?;
        let source = GeocodedLocation::new(place, api_key);
        let source = match &config.location.geocode_url {
            Some(url) => source.with_geocode_url(url),
            None => source,
        };
        debug!(place, "using direct geocoding");
        return Ok(Box::new(source));
    }

    if let Some(coords) = config.fixed_coordinates() {
        debug!(%coords, "using configured coordinates");
        return Ok(Box::new(FixedLocation(coords)));
    }

    if !allow_lookup || !config.location.enabled {
        debug!("location lookup disabled");
        return Ok(Box::new(DeniedLocation));
    }

    let source = match &config.location.lookup_url {
        Some(url) => IpLocation::with_lookup_url(url),
        None => IpLocation::new(),
    };
    debug!(lookup_url = source.lookup_url(), "using IP geolocation");
    Ok(Box::new(source))
}
