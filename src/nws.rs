//! Weather.gov hourly forecast client.
//!
//! A forecast takes two requests: the points lookup resolves coordinates to a
//! forecast office grid, then the grid's hourly forecast is fetched and the
//! first 24 periods are normalized into [`ForecastPeriod`]s.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::StablemanConfig;
use crate::constants::FORECAST_HOURS;
use crate::error::ProviderError;
use crate::feels_like::{calculate_feels_like, DEFAULT_HUMIDITY};
use crate::http::{build_client, get_json};
use crate::models::{HourlyForecastResponse, HourlyPeriod, PointsResponse};
use crate::weather::ForecastPeriod;

pub const PROVIDER: &str = "Weather.gov";

/// Forecast grid that covers a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPoint {
    pub office: String,
    pub grid_x: i32,
    pub grid_y: i32,
    pub city: String,
    pub state: String,
    pub timezone: Option<String>,
}

/// Where a forecast applies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationInfo {
    pub city: String,
    pub state: String,
    pub office: String,
    /// IANA zone reported by the points lookup
    pub timezone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationInfo {
    /// "City, ST", or the coordinates when the city is unknown
    pub fn label(&self) -> String {
        if self.city.is_empty() {
            format!("{}, {}", self.latitude, self.longitude)
        } else if self.state.is_empty() {
            self.city.clone()
        } else {
            format!("{}, {}", self.city, self.state)
        }
    }
}

/// 24-hour forecast with its location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NwsForecast {
    pub location: LocationInfo,
    pub periods: Vec<ForecastPeriod>,
}

/// Weather.gov API client
#[derive(Debug, Clone)]
pub struct NwsClient {
    client: Client,
    base_url: String,
}

impl NwsClient {
    pub fn new(config: &StablemanConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config, PROVIDER)?,
            base_url: config.nws_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves coordinates to the forecast grid covering them
    #[instrument(skip(self))]
    pub async fn get_grid_point(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GridPoint, ProviderError> {
        let url = format!("{}/points/{},{}", self.base_url, latitude, longitude);
        debug!(url = %url, "Fetching grid point");

        let points: PointsResponse = get_json(&self.client, PROVIDER, &url, &[]).await?;
        let props = points.properties;

        let (Some(office), Some(grid_x), Some(grid_y)) = (props.grid_id, props.grid_x, props.grid_y)
        else {
            return Err(ProviderError::InvalidData {
                provider: PROVIDER,
                message: "Missing grid coordinates".to_string(),
            });
        };

        let (city, state) = props
            .relative_location
            .map(|rel| (rel.properties.city, rel.properties.state))
            .unwrap_or_default();

        Ok(GridPoint {
            office,
            grid_x,
            grid_y,
            city,
            state,
            timezone: props.time_zone.filter(|tz| !tz.is_empty()),
        })
    }

    /// Raw hourly periods for a grid
    #[instrument(skip(self), fields(office = %grid.office))]
    pub async fn get_hourly_forecast(
        &self,
        grid: &GridPoint,
    ) -> Result<Vec<HourlyPeriod>, ProviderError> {
        let url = format!(
            "{}/gridpoints/{}/{},{}/forecast/hourly",
            self.base_url, grid.office, grid.grid_x, grid.grid_y
        );
        debug!(url = %url, "Fetching hourly forecast");

        let forecast: HourlyForecastResponse = get_json(&self.client, PROVIDER, &url, &[]).await?;
        Ok(forecast.properties.periods)
    }

    /// Next 24 hourly periods with feels-like values, plus location details
    pub async fn get_24_hour_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<NwsForecast, ProviderError> {
        info!("Fetching Weather.gov forecast for {}, {}", latitude, longitude);

        let grid = self.get_grid_point(latitude, longitude).await?;
        let periods = self.get_hourly_forecast(&grid).await?;

        let periods: Vec<ForecastPeriod> = periods
            .into_iter()
            .take(FORECAST_HOURS)
            .map(normalize_period)
            .collect();
        debug!(count = periods.len(), "Normalized forecast periods");

        Ok(NwsForecast {
            location: LocationInfo {
                city: grid.city,
                state: grid.state,
                office: grid.office,
                timezone: grid.timezone,
                latitude,
                longitude,
            },
            periods,
        })
    }
}

/// Converts a raw hourly period, filling the provider's gaps with defaults
pub fn normalize_period(period: HourlyPeriod) -> ForecastPeriod {
    let humidity = period
        .relative_humidity
        .and_then(|h| h.value)
        .unwrap_or(DEFAULT_HUMIDITY);
    let wind_mph = period.wind_speed.as_deref().map_or(0.0, parse_wind_mph);
    let precipitation_chance = period
        .probability_of_precipitation
        .and_then(|p| p.value)
        .map_or(0, |v| v.clamp(0.0, 100.0).round() as u8);
    let feels_like = period
        .temperature
        .map(|temp| calculate_feels_like(temp, Some(humidity), Some(wind_mph)));

    ForecastPeriod {
        time: period.start_time,
        name: period.name,
        temperature: period.temperature,
        feels_like,
        humidity: Some(humidity),
        wind_mph,
        precipitation_chance,
        short_forecast: period.short_forecast,
    }
}

/// First whole number in a wind description; "5 to 10 mph" reads as 5
pub fn parse_wind_mph(wind_speed: &str) -> f64 {
    wind_speed
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|digits| digits.parse::<u32>().ok())
        .map_or(0.0, f64::from)
}
