/// User agent string for HTTP requests
pub const USER_AGENT: &str = "stableman/0.1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// AmbientWeather.net realtime API base URL
pub const AMBIENT_API_BASE: &str = "https://rt.ambientweather.net/v1";

/// Hourly periods kept from the NWS forecast
pub const FORECAST_HOURS: usize = 24;

/// Default stable location (New York City) when none is configured
pub const DEFAULT_LATITUDE: f64 = 40.7128;
pub const DEFAULT_LONGITUDE: f64 = -74.0060;

/// Time-to-live of cached current conditions, in seconds
pub const CURRENT_CACHE_TTL_SECS: u64 = 60;

/// Time-to-live of cached forecasts, in seconds
pub const FORECAST_CACHE_TTL_SECS: u64 = 30 * 60;

/// Request timeout for both providers, in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
