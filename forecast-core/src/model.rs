use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Layout of OpenWeather's `dt_txt` field, e.g. `2024-05-01 12:00:00`.
pub const FORECAST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub city: String,
    /// Number of forecast steps, string-encoded as the API expects it.
    pub count: String,
}

impl ForecastRequest {
    pub fn new(city: impl Into<String>, count: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            count: count.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub description: String,
    pub forecast_time: Option<String>,
}

impl ForecastEntry {
    pub fn temperature_f(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature_c)
    }

    /// Parsed forecast timestamp, if present and in the `dt_txt` layout.
    pub fn forecast_datetime(&self) -> Option<NaiveDateTime> {
        self.forecast_time
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, FORECAST_TIME_FORMAT).ok())
    }
}

/// Forecast entries in the order the API returned them.
pub type ForecastSet = Vec<ForecastEntry>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityForecast {
    pub city: String,
    pub coordinates: Coordinates,
    pub entries: ForecastSet,
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
