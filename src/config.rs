use serde::{Deserialize, Serialize};

use crate::constants::{
    AMBIENT_API_BASE, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, NWS_API_BASE, REQUEST_TIMEOUT_SECS,
    USER_AGENT,
};
use crate::error::ConfigError;

/// Environment variables the stable needs, with what each one is for
pub const REQUIRED_VARIABLES: [(&str, &str); 5] = [
    ("AMBIENT_API_KEY", "Your AmbientWeather.net API key"),
    ("AMBIENT_APP_KEY", "Your AmbientWeather.net application key"),
    ("AMBIENT_MAC_ADDRESS", "Your weather station MAC address"),
    ("LOCATION_LATITUDE", "Stable location latitude"),
    ("LOCATION_LONGITUDE", "Stable location longitude"),
];

/// Geographic location of the stable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ConfigError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ConfigError::InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
        }
    }
}

/// AmbientWeather.net account credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientCredentials {
    pub api_key: String,
    pub app_key: String,
    /// Station to read; without it the account's stations are listed instead
    pub mac_address: Option<String>,
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StablemanConfig {
    /// Station credentials; `None` skips straight to the Weather.gov fallback
    #[serde(default)]
    pub ambient: Option<AmbientCredentials>,

    #[serde(default)]
    pub location: Location,

    /// IANA timezone of the stable (default: UTC)
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default = "default_nws_base_url")]
    pub nws_base_url: String,

    #[serde(default = "default_ambient_base_url")]
    pub ambient_base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_nws_base_url() -> String {
    NWS_API_BASE.to_string()
}

fn default_ambient_base_url() -> String {
    AMBIENT_API_BASE.to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

const fn default_timeout() -> u64 {
    REQUEST_TIMEOUT_SECS
}

impl Default for StablemanConfig {
    fn default() -> Self {
        Self {
            ambient: None,
            location: Location::default(),
            timezone: None,
            nws_base_url: default_nws_base_url(),
            ambient_base_url: default_ambient_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

impl StablemanConfig {
    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let ambient = match (get("AMBIENT_API_KEY"), get("AMBIENT_APP_KEY")) {
            (Some(api_key), Some(app_key)) => Some(AmbientCredentials {
                api_key,
                app_key,
                mac_address: get("AMBIENT_MAC_ADDRESS"),
            }),
            _ => None,
        };

        let latitude = parse_number("LOCATION_LATITUDE", get("LOCATION_LATITUDE"))?
            .unwrap_or(DEFAULT_LATITUDE);
        let longitude = parse_number("LOCATION_LONGITUDE", get("LOCATION_LONGITUDE"))?
            .unwrap_or(DEFAULT_LONGITUDE);

        let mut config = Self {
            ambient,
            location: Location::new(latitude, longitude)?,
            timezone: get("STABLEMAN_TIMEZONE"),
            ..Self::default()
        };
        if let Some(user_agent) = get("NWS_USER_AGENT") {
            config.user_agent = user_agent;
        }
        Ok(config)
    }

    /// Required variables that are unset, as (name, description) pairs
    pub fn missing_variables(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Vec<(&'static str, &'static str)> {
        REQUIRED_VARIABLES
            .iter()
            .filter(|entry| lookup(entry.0).map_or(true, |v| v.trim().is_empty()))
            .copied()
            .collect()
    }
}

fn parse_number(name: &'static str, value: Option<String>) -> Result<Option<f64>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidNumber { name, value: raw })
        })
        .transpose()
}
