use serde_json::Value;
use std::error::Error;
use tracing::{error, info};

use crate::fetcher::FetchError;

/// Where the outcome of a fetch goes: payloads to `info`, failures to `error`.
pub trait ReportSink: Send + Sync {
    fn info(&self, payload: &Value);
    fn error(&self, error: &FetchError);
}

/// Reports through `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn info(&self, payload: &Value) {
        info!(%payload, "current weather");
    }

    fn error(&self, error: &FetchError) {
        error!(%error, cause = %source_chain(error), "weather fetch failed");
    }
}

/// Every underlying cause of `err`, outermost first, joined with ": ".
/// Empty when `err` has no source.
pub(crate) fn source_chain(err: &dyn Error) -> String {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationError;
    use crate::provider::WeatherError;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct Sending(#[source] Refused);

    #[derive(Debug, thiserror::Error)]
    #[error("weather request failed")]
    struct Outer(#[source] Sending);

    #[test]
    fn tracing_sink_accepts_both_outcomes() {
        // No subscriber installed: events are dropped, but the calls must not panic.
        let sink = TracingSink;
        sink.info(&serde_json::json!({ "cod": 200 }));
        sink.error(&FetchError::Location(LocationError::Timeout));
    }

    #[test]
    fn chain_walks_every_source() {
        assert_eq!(
            source_chain(&Outer(Sending(Refused))),
            "error sending request: connection refused"
        );
    }

    #[test]
    fn chain_is_empty_without_source() {
        let err = FetchError::Location(LocationError::Timeout);
        assert_eq!(source_chain(&err), "");
    }

    #[test]
    fn chain_reaches_through_fetch_error() {
        let parse = serde_json::from_str::<Value>("{").unwrap_err();
        let expected = parse.to_string();
        let err = FetchError::Weather(WeatherError::Parse(parse));
        assert_eq!(source_chain(&err), expected);
    }
}
