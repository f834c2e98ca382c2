//! AmbientWeather.net personal weather station client.

use chrono::DateTime;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::{AmbientCredentials, StablemanConfig};
use crate::error::{ProviderError, StationDevice};
use crate::http::{build_client, get_json};
use crate::models::{AmbientDevice, AmbientObservation};
use crate::weather::{ReadingSource, WeatherReading};

pub const PROVIDER: &str = "AmbientWeather.net";

/// AmbientWeather.net realtime API client
#[derive(Debug, Clone)]
pub struct AmbientClient {
    client: Client,
    base_url: String,
    credentials: AmbientCredentials,
}

impl AmbientClient {
    /// Fails with `NotConfigured` when the config carries no credentials
    pub fn new(config: &StablemanConfig) -> Result<Self, ProviderError> {
        let credentials = config.ambient.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "Weather API keys not configured. Set AMBIENT_API_KEY and AMBIENT_APP_KEY \
                 environment variables."
                    .to_string(),
            )
        })?;

        Ok(Self {
            client: build_client(config, PROVIDER)?,
            base_url: config.ambient_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query = vec![
            ("apiKey", self.credentials.api_key.as_str()),
            ("applicationKey", self.credentials.app_key.as_str()),
        ];
        query.extend_from_slice(extra);

        debug!(url = %url, "AmbientWeather request");
        get_json(&self.client, PROVIDER, &url, &query).await
    }

    /// Stations registered on the account
    pub async fn get_devices(&self) -> Result<Vec<StationDevice>, ProviderError> {
        let devices: Vec<AmbientDevice> = self.request("devices", &[]).await?;
        Ok(devices
            .into_iter()
            .map(|device| StationDevice {
                name: device
                    .info
                    .and_then(|info| info.name)
                    .unwrap_or_else(|| "Unnamed Station".to_string()),
                mac_address: device.mac_address,
            })
            .collect())
    }

    /// Most recent observations of one station, newest first
    #[instrument(skip(self))]
    pub async fn get_device_data(
        &self,
        mac_address: &str,
        limit: u32,
    ) -> Result<Vec<AmbientObservation>, ProviderError> {
        let limit = limit.to_string();
        self.request(&format!("devices/{mac_address}"), &[("limit", limit.as_str())])
            .await
    }

    /// Latest reading of the configured station.
    ///
    /// Without a configured MAC address the account's stations are listed and
    /// returned in a `DeviceSelection` error so one can be chosen.
    pub async fn latest_reading(&self) -> Result<WeatherReading, ProviderError> {
        let Some(mac_address) = self.credentials.mac_address.as_deref() else {
            warn!("No station MAC address configured, listing stations");
            let devices = self.get_devices().await?;
            if devices.is_empty() {
                return Err(ProviderError::NotConfigured(
                    "No weather stations found".to_string(),
                ));
            }
            return Err(ProviderError::DeviceSelection { devices });
        };

        info!("Fetching latest reading from station {}", mac_address);
        let observation = self
            .get_device_data(mac_address, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidData {
                provider: PROVIDER,
                message: "No weather data available for specified device".to_string(),
            })?;

        reading_from(observation, mac_address)
    }
}

/// Converts a station observation; the air temperature is required
pub fn reading_from(
    observation: AmbientObservation,
    mac_address: &str,
) -> Result<WeatherReading, ProviderError> {
    let temperature = observation.tempf.ok_or_else(|| ProviderError::InvalidData {
        provider: PROVIDER,
        message: "Reading has no temperature".to_string(),
    })?;

    let timestamp = observation
        .dateutc
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339());

    Ok(WeatherReading {
        temperature,
        feels_like: observation.feels_like.or(observation.feelslikef),
        humidity: observation.humidity,
        timestamp,
        station_name: format!("Weather Station ({mac_address})"),
        source: ReadingSource::Ambient,
    })
}
