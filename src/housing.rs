//! Housing status rules: whether horses stay in the barn or go out.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::weather::{ForecastPeriod, WeatherReading};

/// Where the horses spend the upcoming care phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum HousingStatus {
    #[serde(rename = "OUT", alias = "out", alias = "Horses OUT")]
    Out,
    #[serde(rename = "IN", alias = "in", alias = "Horses IN")]
    In,
}

impl fmt::Display for HousingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Out => write!(f, "Horses OUT"),
            Self::In => write!(f, "Horses IN"),
        }
    }
}

/// Result of a housing evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingDecision {
    pub status: HousingStatus,
    pub reason: String,
    /// False when a weather rule forces the status
    pub user_selectable: bool,
}

impl HousingDecision {
    fn forced_in(reason: String) -> Self {
        Self {
            status: HousingStatus::In,
            reason,
            user_selectable: false,
        }
    }

    fn out_by_choice(reason: &str) -> Self {
        Self {
            status: HousingStatus::Out,
            reason: reason.to_string(),
            user_selectable: true,
        }
    }
}

/// Thresholds behind the housing rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HousingRules {
    /// Equine heat index that forces horses in under cloud cover
    pub cloudy_heat_index: f64,
    /// Equine heat index that forces horses in under sun
    pub sunny_heat_index: f64,
    /// Heat index rules only apply above this temperature (°F)
    pub heat_index_min_temp: f64,
    /// Rain chance (%) above which horses stay in
    pub rain_chance: u8,
    /// How many leading periods decide whether the day is cloudy
    pub cloud_lookahead: usize,
}

impl HousingRules {
    pub const DEFAULT: Self = Self {
        cloudy_heat_index: 150.0,
        sunny_heat_index: 120.0,
        heat_index_min_temp: 75.0,
        rain_chance: 10,
        cloud_lookahead: 4,
    };

    /// Evaluates the rules in priority order; the first match wins.
    pub fn resolve(
        &self,
        reading: Option<&WeatherReading>,
        periods: &[ForecastPeriod],
    ) -> HousingDecision {
        let Some(reading) = reading else {
            return HousingDecision::out_by_choice("No weather data available");
        };

        if let Some(heat_index) = self.equine_heat_index(reading) {
            let cloudy = self.is_cloudy(periods);
            if cloudy && heat_index > self.cloudy_heat_index {
                return HousingDecision::forced_in(format!(
                    "High heat index ({heat_index:.0}) in cloudy weather"
                ));
            }
            if !cloudy && heat_index > self.sunny_heat_index {
                return HousingDecision::forced_in(format!(
                    "High heat index ({heat_index:.0}) in sunny weather"
                ));
            }
        }

        let rain_chance = max_rain_chance(periods);
        if rain_chance > self.rain_chance {
            return HousingDecision::forced_in(format!("Rain expected ({rain_chance}% chance)"));
        }

        HousingDecision::out_by_choice("Good conditions for outdoor housing")
    }

    /// Temperature plus relative humidity, only above the minimum temperature
    pub fn equine_heat_index(&self, reading: &WeatherReading) -> Option<f64> {
        let humidity = reading.humidity?;
        (reading.temperature > self.heat_index_min_temp).then(|| reading.temperature + humidity)
    }

    /// More than half of the leading periods mention clouds. No forecast reads as sunny.
    pub fn is_cloudy(&self, periods: &[ForecastPeriod]) -> bool {
        let leading = &periods[..periods.len().min(self.cloud_lookahead)];
        if leading.is_empty() {
            return false;
        }

        let cloudy = leading.iter().filter(|p| mentions_clouds(&p.short_forecast)).count();
        cloudy * 2 > leading.len()
    }
}

impl Default for HousingRules {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Determines housing status with the default rules
pub fn resolve_housing_status(
    reading: Option<&WeatherReading>,
    periods: &[ForecastPeriod],
) -> HousingDecision {
    HousingRules::DEFAULT.resolve(reading, periods)
}

/// Highest precipitation chance across the forecast, 0 when empty
pub fn max_rain_chance(periods: &[ForecastPeriod]) -> u8 {
    periods
        .iter()
        .map(|p| p.precipitation_chance)
        .max()
        .unwrap_or(0)
}

fn mentions_clouds(short_forecast: &str) -> bool {
    let text = short_forecast.to_lowercase();
    ["cloud", "overcast", "partly"]
        .iter()
        .any(|needle| text.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::ReadingSource;

    fn reading(temperature: f64, humidity: f64) -> WeatherReading {
        WeatherReading {
            temperature,
            feels_like: None,
            humidity: Some(humidity),
            timestamp: None,
            station_name: "Barn station".to_string(),
            source: ReadingSource::Ambient,
        }
    }

    fn sky(text: &str) -> ForecastPeriod {
        ForecastPeriod {
            short_forecast: text.to_string(),
            ..Default::default()
        }
    }

    fn rain(chance: u8) -> ForecastPeriod {
        ForecastPeriod {
            precipitation_chance: chance,
            short_forecast: "Scattered Showers".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn no_reading_leaves_horses_out_with_choice() {
        let decision = resolve_housing_status(None, &[]);
        assert_eq!(decision.status, HousingStatus::Out);
        assert!(decision.user_selectable);
        assert!(decision.reason.contains("No weather data"));
    }

    #[test]
    fn rain_above_threshold_forces_horses_in() {
        let decision = resolve_housing_status(Some(&reading(70.0, 50.0)), &[rain(5), rain(15)]);
        assert_eq!(decision.status, HousingStatus::In);
        assert!(!decision.user_selectable);
        assert_eq!(decision.reason, "Rain expected (15% chance)");
    }

    #[test]
    fn rain_at_threshold_does_not_force() {
        let decision = resolve_housing_status(Some(&reading(70.0, 50.0)), &[rain(10), rain(10)]);
        assert_eq!(decision.status, HousingStatus::Out);
        assert!(decision.user_selectable);
    }

    #[test]
    fn heat_index_ignored_at_or_below_seventy_five() {
        let decision = resolve_housing_status(Some(&reading(74.0, 80.0)), &[]);
        assert_eq!(decision.status, HousingStatus::Out);
        assert!(decision.user_selectable);
    }

    #[test]
    fn cloudy_heat_index_forces_horses_in() {
        let periods = [
            sky("Mostly Cloudy"),
            sky("Overcast"),
            sky("Partly Cloudy"),
            sky("Sunny"),
        ];
        let decision = resolve_housing_status(Some(&reading(80.0, 75.0)), &periods);
        assert_eq!(decision.status, HousingStatus::In);
        assert!(!decision.user_selectable);
        assert_eq!(decision.reason, "High heat index (155) in cloudy weather");
    }

    #[test]
    fn sunny_heat_index_forces_horses_in() {
        let periods = [sky("Sunny"), sky("Clear"), sky("Fair"), sky("Sunny")];
        let decision = resolve_housing_status(Some(&reading(76.0, 50.0)), &periods);
        assert_eq!(decision.status, HousingStatus::In);
        assert_eq!(decision.reason, "High heat index (126) in sunny weather");
    }

    #[test]
    fn sunny_heat_index_at_threshold_stays_out() {
        let decision = resolve_housing_status(Some(&reading(76.0, 44.0)), &[sky("Sunny")]);
        assert_eq!(decision.status, HousingStatus::Out);
        assert!(decision.user_selectable);
    }

    #[test]
    fn cloudy_threshold_is_higher_than_sunny() {
        // 140 would force horses in under sun but not under clouds
        let periods = [sky("Cloudy"), sky("Cloudy"), sky("Cloudy")];
        let decision = resolve_housing_status(Some(&reading(80.0, 60.0)), &periods);
        assert_eq!(decision.status, HousingStatus::Out);
        assert_eq!(decision.reason, "Good conditions for outdoor housing");
    }

    #[test]
    fn heat_index_outranks_rain() {
        let mut periods = vec![sky("Sunny"); 4];
        periods.push(rain(80));
        let decision = resolve_housing_status(Some(&reading(85.0, 60.0)), &periods);
        assert!(decision.reason.starts_with("High heat index"));
    }

    #[test]
    fn cloud_detection_needs_a_majority_of_four() {
        let rules = HousingRules::default();
        assert!(rules.is_cloudy(&[
            sky("Mostly Cloudy"),
            sky("Overcast"),
            sky("Partly Sunny"),
            sky("Cloudy"),
        ]));
        assert!(!rules.is_cloudy(&[sky("Sunny"), sky("Cloudy"), sky("Clear"), sky("Fair")]));
        assert!(!rules.is_cloudy(&[sky("Sunny"), sky("Cloudy"), sky("Overcast"), sky("Fair")]));
        assert!(!rules.is_cloudy(&[]));
        // only the first four periods count
        assert!(!rules.is_cloudy(&[
            sky("Sunny"),
            sky("Sunny"),
            sky("Sunny"),
            sky("Cloudy"),
            sky("Cloudy"),
            sky("Cloudy"),
        ]));
    }

    #[test]
    fn max_rain_chance_defaults_to_zero() {
        assert_eq!(max_rain_chance(&[]), 0);
        assert_eq!(max_rain_chance(&[rain(5), rain(22), rain(8)]), 22);
    }

    #[test]
    fn substituted_rules_change_the_outcome() {
        let strict = HousingRules {
            rain_chance: 0,
            ..HousingRules::DEFAULT
        };
        let decision = strict.resolve(Some(&reading(60.0, 40.0)), &[rain(5)]);
        assert_eq!(decision.status, HousingStatus::In);
    }

    #[test]
    fn housing_status_serializes_short_names() {
        assert_eq!(serde_json::to_string(&HousingStatus::Out).unwrap(), "\"OUT\"");
        let parsed: HousingStatus = serde_json::from_str("\"Horses IN\"").unwrap();
        assert_eq!(parsed, HousingStatus::In);
        assert_eq!(HousingStatus::In.to_string(), "Horses IN");
    }
}
