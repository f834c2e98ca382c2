use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::housing::HousingStatus;

// ============================================================================
// National Weather Service API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
pub struct PointsProperties {
    #[serde(rename = "gridId")]
    pub grid_id: Option<String>,
    #[serde(rename = "gridX")]
    pub grid_x: Option<i32>,
    #[serde(rename = "gridY")]
    pub grid_y: Option<i32>,
    #[serde(rename = "timeZone", default)]
    pub time_zone: Option<String>,
    #[serde(rename = "relativeLocation", default)]
    pub relative_location: Option<RelativeLocation>,
}

#[derive(Debug, Deserialize)]
pub struct RelativeLocation {
    pub properties: RelativeLocationProperties,
}

#[derive(Debug, Deserialize)]
pub struct RelativeLocationProperties {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct HourlyForecastResponse {
    pub properties: HourlyForecastProperties,
}

#[derive(Debug, Deserialize)]
pub struct HourlyForecastProperties {
    pub periods: Vec<HourlyPeriod>,
}

#[derive(Debug, Deserialize)]
pub struct HourlyPeriod {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "startTime", default)]
    pub start_time: String,
    pub temperature: Option<f64>,
    #[serde(rename = "relativeHumidity", default)]
    pub relative_humidity: Option<QuantitativeValue>,
    #[serde(rename = "probabilityOfPrecipitation", default)]
    pub probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(rename = "windSpeed", default)]
    pub wind_speed: Option<String>,
    #[serde(rename = "shortForecast", default)]
    pub short_forecast: String,
}

/// NWS `{ "unitCode": ..., "value": ... }` pair; value is null when unknown
#[derive(Debug, Deserialize)]
pub struct QuantitativeValue {
    pub value: Option<f64>,
}

// ============================================================================
// AmbientWeather.net API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AmbientDevice {
    #[serde(rename = "macAddress", default)]
    pub mac_address: String,
    #[serde(default)]
    pub info: Option<AmbientDeviceInfo>,
}

#[derive(Debug, Deserialize)]
pub struct AmbientDeviceInfo {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmbientObservation {
    pub tempf: Option<f64>,
    #[serde(rename = "feelsLike")]
    pub feels_like: Option<f64>,
    pub feelslikef: Option<f64>,
    pub humidity: Option<f64>,
    /// Milliseconds since the epoch
    pub dateutc: Option<i64>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct LocationRequest {
    /// Stable latitude; defaults to the configured location
    pub latitude: Option<f64>,
    /// Stable longitude; defaults to the configured location
    pub longitude: Option<f64>,
    /// IANA timezone of the stable, e.g. "America/New_York"
    pub timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct BlanketingRequest {
    #[serde(flatten)]
    pub location: LocationRequest,
    /// Override the automatic housing decision ("OUT" or "IN"). Ignored when
    /// weather forces horses in.
    pub housing: Option<HousingStatus>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CareInstructionsRequest {
    /// Blanket category name: "none", "light", "medium" or "heavy"
    pub category: String,
    pub housing: HousingStatus,
}
