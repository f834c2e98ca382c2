//! Weather sources behind the service.
//!
//! Current conditions come from the personal station when it answers and from
//! the first Weather.gov hourly period otherwise. Both seams are traits so the
//! service can be driven by in-memory sources in tests.

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ambient::AmbientClient;
use crate::config::Location;
use crate::constants::{CURRENT_CACHE_TTL_SECS, FORECAST_CACHE_TTL_SECS};
use crate::error::ProviderError;
use crate::nws::{NwsClient, NwsForecast};
use crate::weather::{ReadingSource, WeatherReading};

/// Supplies current conditions at a location
#[async_trait]
pub trait CurrentConditions: Send + Sync {
    async fn current_reading(&self, location: Location) -> Result<WeatherReading, ProviderError>;
}

/// Supplies the 24-hour forecast at a location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn forecast(&self, location: Location) -> Result<NwsForecast, ProviderError>;
}

#[async_trait]
impl ForecastSource for NwsClient {
    async fn forecast(&self, location: Location) -> Result<NwsForecast, ProviderError> {
        self.get_24_hour_forecast(location.latitude, location.longitude)
            .await
    }
}

/// The station reads one fixed place, so the location is ignored
#[async_trait]
impl CurrentConditions for AmbientClient {
    async fn current_reading(&self, _location: Location) -> Result<WeatherReading, ProviderError> {
        self.latest_reading().await
    }
}

#[async_trait]
impl<T: ForecastSource + ?Sized> ForecastSource for Arc<T> {
    async fn forecast(&self, location: Location) -> Result<NwsForecast, ProviderError> {
        (**self).forecast(location).await
    }
}

#[async_trait]
impl<T: CurrentConditions + ?Sized> CurrentConditions for Arc<T> {
    async fn current_reading(&self, location: Location) -> Result<WeatherReading, ProviderError> {
        (**self).current_reading(location).await
    }
}

/// Station first, then the first Weather.gov forecast period
pub struct FallbackConditions<F> {
    station: Option<Arc<dyn CurrentConditions>>,
    forecast: F,
}

impl<F: ForecastSource> FallbackConditions<F> {
    /// `station` is `None` when no station is configured
    pub fn new(station: Option<Arc<dyn CurrentConditions>>, forecast: F) -> Self {
        Self { station, forecast }
    }

    async fn from_station(&self, location: Location) -> Result<WeatherReading, ProviderError> {
        match &self.station {
            Some(station) => station.current_reading(location).await,
            None => Err(ProviderError::NotConfigured(
                "Weather station not configured".to_string(),
            )),
        }
    }

    async fn from_forecast(&self, location: Location) -> Result<WeatherReading, ProviderError> {
        let forecast = self.forecast.forecast(location).await?;
        reading_from_forecast(&forecast)
    }
}

#[async_trait]
impl<F: ForecastSource> CurrentConditions for FallbackConditions<F> {
    async fn current_reading(&self, location: Location) -> Result<WeatherReading, ProviderError> {
        info!("Fetching current conditions");

        let station_error = match self.from_station(location).await {
            Ok(reading) => {
                info!("Using station reading from {}", reading.station_name);
                return Ok(reading);
            }
            Err(err) => err,
        };
        warn!("Station unavailable: {}", station_error);

        info!("Falling back to Weather.gov for current conditions");
        match self.from_forecast(location).await {
            Ok(reading) => Ok(reading),
            Err(weather_gov) => Err(ProviderError::AllSourcesFailed {
                station: Box::new(station_error),
                weather_gov: Box::new(weather_gov),
            }),
        }
    }
}

/// Current conditions taken from the first forecast period
pub fn reading_from_forecast(forecast: &NwsForecast) -> Result<WeatherReading, ProviderError> {
    let first = forecast
        .periods
        .first()
        .ok_or_else(|| ProviderError::InvalidData {
            provider: crate::nws::PROVIDER,
            message: "Weather.gov returned no forecast data".to_string(),
        })?;
    let temperature = first.temperature.ok_or_else(|| ProviderError::InvalidData {
        provider: crate::nws::PROVIDER,
        message: "First forecast period has no temperature".to_string(),
    })?;

    let location = &forecast.location;
    let city = if location.city.is_empty() {
        "Weather Station"
    } else {
        location.city.as_str()
    };
    let office = if location.office.is_empty() {
        "NWS"
    } else {
        location.office.as_str()
    };

    Ok(WeatherReading {
        temperature,
        feels_like: first.feels_like,
        humidity: first.humidity,
        timestamp: Some(first.time.clone()).filter(|t| !t.is_empty()),
        station_name: format!("NWS {city} ({office})"),
        source: ReadingSource::WeatherGov,
    })
}

fn cache_key(location: Location) -> String {
    format!("{:.4},{:.4}", location.latitude, location.longitude)
}

/// Source wrapper that keeps successful answers for a fixed time
pub struct Cached<S, V> {
    inner: S,
    cache: Cache<String, V>,
}

impl<S, V: Clone + Send + Sync + 'static> Cached<S, V> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder().max_capacity(64).time_to_live(ttl).build(),
        }
    }

    async fn get_or_fetch<Fut>(&self, location: Location, fetch: Fut) -> Result<V, ProviderError>
    where
        Fut: std::future::Future<Output = Result<V, ProviderError>>,
    {
        let key = cache_key(location);
        if let Some(value) = self.cache.get(&key).await {
            debug!(key = %key, "Cache hit");
            return Ok(value);
        }
        debug!(key = %key, "Cache miss");

        let value = fetch.await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}

impl<S: ForecastSource> Cached<S, NwsForecast> {
    pub fn forecasts(inner: S) -> Self {
        Self::new(inner, Duration::from_secs(FORECAST_CACHE_TTL_SECS))
    }
}

impl<S: CurrentConditions> Cached<S, WeatherReading> {
    pub fn readings(inner: S) -> Self {
        Self::new(inner, Duration::from_secs(CURRENT_CACHE_TTL_SECS))
    }
}

#[async_trait]
impl<S: ForecastSource> ForecastSource for Cached<S, NwsForecast> {
    async fn forecast(&self, location: Location) -> Result<NwsForecast, ProviderError> {
        self.get_or_fetch(location, self.inner.forecast(location))
            .await
    }
}

#[async_trait]
impl<S: CurrentConditions> CurrentConditions for Cached<S, WeatherReading> {
    async fn current_reading(&self, location: Location) -> Result<WeatherReading, ProviderError> {
        self.get_or_fetch(location, self.inner.current_reading(location))
            .await
    }
}
