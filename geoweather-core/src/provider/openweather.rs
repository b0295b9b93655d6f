use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{WeatherError, WeatherSource};
use crate::model::Coordinates;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request URL for `coords`. Latitude and longitude are written exactly as
    /// `f64` displays them; `units=metric` is always present.
    pub fn build_url(&self, coords: Coordinates) -> String {
        format!(
            "{}?lat={}&lon={}&appid={}&units=metric",
            self.base_url, coords.latitude, coords.longitude, self.api_key
        )
    }
}

// The API key stays out of logs and panics.
impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current_weather(&self, coords: Coordinates) -> Result<Value, WeatherError> {
        let url = self.build_url(coords);
        debug!(base_url = %self.base_url, "requesting current weather");

        let res = self.http.get(&url).send().await.map_err(strip_url)?;

        let status = res.status();
        let body = res.text().await.map_err(strip_url)?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let payload = serde_json::from_str(&body)?;
        debug!(%status, "current weather received");
        Ok(payload)
    }
}

// reqwest errors embed the request URL, which carries the API key.
fn strip_url(err: reqwest::Error) -> WeatherError {
    WeatherError::Request(err.without_url())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_url_from_template() {
        let client = OpenWeatherClient::new("KEY".to_string());
        let url = client.build_url(Coordinates::new(51.5074, -0.1278));
        assert_eq!(
            url,
            "http://api.openweathermap.org/data/2.5/weather?lat=51.5074&lon=-0.1278&appid=KEY&units=metric"
        );
    }

    #[test]
    fn integral_coordinates_have_no_trailing_zero() {
        let client = OpenWeatherClient::new("KEY".to_string());
        let url = client.build_url(Coordinates::new(0.0, -180.0));
        assert!(url.contains("lat=0&lon=-180&"));
        assert!(url.ends_with("&units=metric"));
    }

    #[test]
    fn debug_hides_api_key() {
        let client = OpenWeatherClient::new("SECRET".to_string());
        let shown = format!("{client:?}");
        assert!(!shown.contains("SECRET"));
        assert!(shown.contains("redacted"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "short body";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(150);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 203);
    }
}
