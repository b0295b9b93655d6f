//! Locate, fetch, report.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    location::{LocationError, LocationSource},
    provider::{WeatherError, WeatherSource},
    report::ReportSink,
};

/// Why a fetch produced no payload.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// Runs one location lookup followed by at most one weather request.
///
/// Nothing is retried and no timeout is added on top of what the sources do.
#[derive(Debug)]
pub struct WeatherFetcher<L, W> {
    location: L,
    weather: W,
}

impl<L: LocationSource, W: WeatherSource> WeatherFetcher<L, W> {
    pub fn new(location: L, weather: W) -> Self {
        Self { location, weather }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Value, FetchError> {
        let coords = self.location.current_position().await?;
        debug!(%coords, "position acquired");

        let payload = self.weather.current_weather(coords).await?;
        Ok(payload)
    }

    /// Fetch and hand the outcome to `sink`: exactly one `info` or one `error` call.
    pub async fn run(&self, sink: &dyn ReportSink) {
        match self.fetch().await {
            Ok(payload) => sink.info(&payload),
            Err(err) => sink.error(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use async_trait::async_trait;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct StubLocation(Option<Coordinates>);

    #[async_trait]
    impl LocationSource for StubLocation {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            self.0
                .ok_or_else(|| LocationError::PermissionDenied("user declined".to_string()))
        }
    }

    #[derive(Debug)]
    struct StubWeather {
        reply: Option<Value>,
        calls: AtomicUsize,
        seen: Mutex<Vec<Coordinates>>,
    }

    impl StubWeather {
        fn replying(reply: Option<Value>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WeatherSource for StubWeather {
        async fn current_weather(&self, coords: Coordinates) -> Result<Value, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(coords);
            match &self.reply {
                Some(v) => Ok(v.clone()),
                None => Err(WeatherError::Parse(
                    serde_json::from_str::<Value>("{").unwrap_err(),
                )),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        infos: Mutex<Vec<Value>>,
        errors: Mutex<Vec<String>>,
    }

    impl ReportSink for RecordingSink {
        fn info(&self, payload: &Value) {
            self.infos.lock().unwrap().push(payload.clone());
        }

        fn error(&self, error: &FetchError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    #[tokio::test]
    async fn success_reports_payload_once() {
        let body = serde_json::json!({ "name": "London", "main": { "temp": 11.2 } });
        let london = Coordinates::new(51.5074, -0.1278);
        let fetcher = WeatherFetcher::new(
            StubLocation(Some(london)),
            StubWeather::replying(Some(body.clone())),
        );
        let sink = RecordingSink::default();

        fetcher.run(&sink).await;

        assert_eq!(*sink.infos.lock().unwrap(), vec![body]);
        assert!(sink.errors.lock().unwrap().is_empty());
        assert_eq!(*fetcher.weather.seen.lock().unwrap(), vec![london]);
    }

    #[tokio::test]
    async fn location_failure_skips_weather_request() {
        let fetcher = WeatherFetcher::new(
            StubLocation(None),
            StubWeather::replying(Some(Value::Null)),
        );
        let sink = RecordingSink::default();

        fetcher.run(&sink).await;

        assert_eq!(fetcher.weather.calls.load(Ordering::SeqCst), 0);
        assert!(sink.infos.lock().unwrap().is_empty());
        let errors = sink.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("permission denied"));
    }

    #[tokio::test]
    async fn weather_failure_reports_one_error_after_one_request() {
        let fetcher = WeatherFetcher::new(
            StubLocation(Some(Coordinates::new(1.0, 2.0))),
            StubWeather::replying(None),
        );
        let sink = RecordingSink::default();

        fetcher.run(&sink).await;

        assert_eq!(fetcher.weather.calls.load(Ordering::SeqCst), 1);
        assert!(sink.infos.lock().unwrap().is_empty());
        assert_eq!(sink.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_keeps_error_kind() {
        let fetcher = WeatherFetcher::new(StubLocation(None), StubWeather::replying(None));
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Location(LocationError::PermissionDenied(_))
        ));

        let fetcher = WeatherFetcher::new(
            StubLocation(Some(Coordinates::new(1.0, 2.0))),
            StubWeather::replying(None),
        );
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Weather(WeatherError::Parse(_))));
    }
}
