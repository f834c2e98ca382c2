use serde::{Deserialize, Serialize};

/// Where a current-conditions reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    /// Personal weather station on AmbientWeather.net
    Ambient,
    /// First hourly period of the Weather.gov forecast
    WeatherGov,
}

impl ReadingSource {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ambient => "Personal Weather Station (AmbientWeather.net)",
            Self::WeatherGov => "National Weather Service (Weather.gov)",
        }
    }
}

/// A point-in-time observation of current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature in °F
    pub temperature: f64,
    /// Apparent temperature in °F, when the source reports one
    pub feels_like: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    /// Provider timestamp, as reported
    pub timestamp: Option<String>,
    pub station_name: String,
    pub source: ReadingSource,
}

impl WeatherReading {
    /// Feels-like temperature, or the air temperature when none was reported
    pub fn effective_feels_like(&self) -> f64 {
        self.feels_like.unwrap_or(self.temperature)
    }
}

/// One hourly period of the 24-hour forecast, already normalized.
///
/// `time` is kept as the raw provider timestamp; consumers that need a
/// point in time parse it themselves and skip values they cannot read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub time: String,
    pub name: String,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_mph: f64,
    /// Chance of precipitation, 0-100
    pub precipitation_chance: u8,
    pub short_forecast: String,
}
