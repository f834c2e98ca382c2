use thiserror::Error;

/// Failures of the weather providers
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request could not be sent or the connection dropped
    #[error("{provider} request failed: {message}")]
    RequestFailed {
        provider: &'static str,
        message: String,
    },

    /// Provider answered with a non-success status
    #[error("{provider} HTTP error: {status}")]
    Status {
        provider: &'static str,
        status: u16,
    },

    /// Rate limit exceeded
    #[error("{provider} rate limit exceeded. Please try again later.")]
    RateLimited { provider: &'static str },

    /// Response body did not have the expected shape
    #[error("{provider} returned invalid data: {message}")]
    InvalidData {
        provider: &'static str,
        message: String,
    },

    /// Station credentials or coordinates are not configured
    #[error("{0}")]
    NotConfigured(String),

    /// The account has stations but none was chosen
    #[error("Weather station selection required: {}", format_devices(.devices))]
    DeviceSelection { devices: Vec<StationDevice> },

    /// Both current-conditions sources failed
    #[error("All weather sources failed. Station: {station}. Weather.gov: {weather_gov}")]
    AllSourcesFailed {
        station: Box<ProviderError>,
        weather_gov: Box<ProviderError>,
    },
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::AllSourcesFailed {
                station,
                weather_gov,
            } => station.is_rate_limited() || weather_gov.is_rate_limited(),
            _ => false,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured(_) | Self::DeviceSelection { .. })
    }
}

/// A weather station registered on the account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationDevice {
    pub name: String,
    pub mac_address: String,
}

fn format_devices(devices: &[StationDevice]) -> String {
    devices
        .iter()
        .map(|d| format!("{} ({})", d.name, d.mac_address))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Invalid configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,
}
