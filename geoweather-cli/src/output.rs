use geoweather_core::{CurrentConditions, FetchError, ReportSink, TracingSink};
use serde_json::Value;

/// Prints payloads to stdout; failures go to the error log.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    summary: bool,
    log: TracingSink,
}

impl ConsoleSink {
    pub fn new(summary: bool) -> Self {
        Self {
            summary,
            log: TracingSink,
        }
    }

    fn render(&self, payload: &Value) -> Result<String, FetchError> {
        if self.summary {
            let conditions = CurrentConditions::from_payload(payload)?;
            return Ok(conditions.to_string());
        }
        serde_json::to_string_pretty(payload).map_err(|e| FetchError::Weather(e.into()))
    }
}

impl ReportSink for ConsoleSink {
    fn info(&self, payload: &Value) {
        match self.render(payload) {
            Ok(text) => println!("{text}"),
            Err(err) => self.log.error(&err),
        }
    }

    fn error(&self, error: &FetchError) {
        self.log.error(error);
    }
}
