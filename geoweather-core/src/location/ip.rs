use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{LocationError, LocationSource, transport_error};
use crate::model::Coordinates;

pub const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Approximate position of this machine's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    lookup_url: String,
    http: Client,
}

impl IpLocation {
    pub fn new() -> Self {
        Self::with_lookup_url(DEFAULT_LOOKUP_URL)
    }

    pub fn with_lookup_url(lookup_url: impl Into<String>) -> Self {
        Self::with_client(lookup_url, Client::new())
    }

    pub fn with_client(lookup_url: impl Into<String>, http: Client) -> Self {
        Self {
            lookup_url: lookup_url.into(),
            http,
        }
    }

    pub fn lookup_url(&self) -> &str {
        &self.lookup_url
    }
}

impl Default for IpLocation {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

#[async_trait]
impl LocationSource for IpLocation {
    #[instrument(skip(self), fields(lookup_url = %self.lookup_url))]
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let res = self
            .http
            .get(&self.lookup_url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LocationError::PermissionDenied(format!(
                "lookup service refused the request with status {status}"
            )));
        }
        if !status.is_success() {
            return Err(LocationError::PositionUnavailable(format!(
                "lookup service answered with status {status}"
            )));
        }

        let body = res.text().await.map_err(transport_error)?;
        let parsed: IpApiResponse = serde_json::from_str(&body).map_err(|e| {
            LocationError::PositionUnavailable(format!("malformed lookup response: {e}"))
        })?;

        if parsed.status != "success" {
            return Err(LocationError::PositionUnavailable(
                parsed
                    .message
                    .unwrap_or_else(|| format!("lookup status '{}'", parsed.status)),
            ));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => {
                let coords = Coordinates::new(lat, lon);
                debug!(%coords, city = ?parsed.city, "position resolved");
                Ok(coords)
            }
            _ => Err(LocationError::PositionUnavailable(
                "lookup response carried no coordinates".to_string(),
            )),
        }
    }
}
