//! Human-readable view of an OpenWeather current-weather payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::provider::WeatherError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observation_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
}

impl CurrentConditions {
    /// Extract the summary fields. Only `main.temp`, `main.feels_like` and
    /// `main.humidity` are required.
    pub fn from_payload(payload: &Value) -> Result<Self, WeatherError> {
        let parsed = OwCurrentResponse::deserialize(payload)?;

        let name = parsed.name.filter(|n| !n.is_empty());
        let country = parsed.sys.and_then(|s| s.country).filter(|c| !c.is_empty());
        let location_name = match (name, country) {
            (Some(name), Some(country)) => format!("{name}, {country}"),
            (Some(name), None) => name,
            (None, _) => "Unknown".to_string(),
        };

        let condition = parsed
            .weather
            .first()
            .map(|w| title_case(&w.description))
            .unwrap_or_else(|| "Unknown".to_string());

        let observation_time = parsed
            .dt
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        Ok(Self {
            location_name,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            condition,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.map(|w| w.speed).unwrap_or(0.0),
            observation_time,
        })
    }
}

impl fmt::Display for CurrentConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current weather for {}", self.location_name)?;
        writeln!(
            f,
            "Temperature: {:.1}°C (feels like {:.1}°C)",
            self.temperature_c, self.feels_like_c
        )?;
        writeln!(f, "Condition: {}", self.condition)?;
        writeln!(f, "Humidity: {}%", self.humidity_pct)?;
        writeln!(f, "Wind Speed: {:.1} m/s", self.wind_speed_mps)?;
        write!(
            f,
            "Observed: {}",
            self.observation_time.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
