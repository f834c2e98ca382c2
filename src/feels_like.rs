/// Humidity assumed when a provider omits it
pub const DEFAULT_HUMIDITY: f64 = 50.0;

/// Heat index applies at or above this temperature (°F)
const HEAT_INDEX_MIN_TEMP: f64 = 80.0;

/// Wind chill applies at or below this temperature (°F)
const WIND_CHILL_MAX_TEMP: f64 = 50.0;

/// Wind chill needs more than this much wind (mph)
const WIND_CHILL_MIN_WIND: f64 = 3.0;

/// Calculates an apparent temperature in °F from the raw readings.
///
/// Hot air uses the Steadman heat index regression, cold windy air uses the
/// NWS wind chill formula, and everything in between is returned unchanged.
pub fn calculate_feels_like(temp_f: f64, humidity: Option<f64>, wind_mph: Option<f64>) -> f64 {
    let humidity = humidity.unwrap_or(DEFAULT_HUMIDITY);
    let wind_mph = wind_mph.unwrap_or(0.0);

    if temp_f >= HEAT_INDEX_MIN_TEMP {
        round_tenth(heat_index(temp_f, humidity))
    } else if temp_f <= WIND_CHILL_MAX_TEMP && wind_mph > WIND_CHILL_MIN_WIND {
        round_tenth(wind_chill(temp_f, wind_mph))
    } else {
        temp_f
    }
}

fn heat_index(t: f64, h: f64) -> f64 {
    -42.379 + 2.04901523 * t + 10.14333127 * h
        - 0.22475541 * t * h
        - 6.83783e-3 * t * t
        - 5.481717e-2 * h * h
        + 1.22874e-3 * t * t * h
        + 8.5282e-4 * t * h * h
        - 1.99e-6 * t * t * h * h
}

fn wind_chill(t: f64, w: f64) -> f64 {
    let wind_factor = w.powf(0.16);
    35.74 + 0.6215 * t - 35.75 * wind_factor + 0.4275 * t * wind_factor
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
