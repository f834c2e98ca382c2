//! Blanket category engine.
//!
//! Turns feels-like temperatures into one of four blanket weights. With an
//! hourly forecast the current and forecast scores are blended; without one
//! the colder of current and forecast low decides. Both paths demote heavy
//! recommendations one tier when a sharp temperature drop is coming, so horses
//! are not overheated before the cold arrives.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::housing::HousingStatus;
use crate::weather::ForecastPeriod;

/// Blanket weight, ordered from lightest to heaviest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BlanketCategory {
    None,
    Light,
    Medium,
    Heavy,
}

impl BlanketCategory {
    pub const ALL: [Self; 4] = [Self::None, Self::Light, Self::Medium, Self::Heavy];

    /// Integer score used for averaging (0 = none .. 3 = heavy)
    pub fn score(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Light => 1,
            Self::Medium => 2,
            Self::Heavy => 3,
        }
    }

    /// Maps an averaged score back onto the nearest category
    pub fn from_score(score: f64) -> Self {
        if score < 0.5 {
            Self::None
        } else if score < 1.5 {
            Self::Light
        } else if score < 2.5 {
            Self::Medium
        } else {
            Self::Heavy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }

    /// One tier lighter for heavy and medium; light and none are left alone
    fn stepped_down(self) -> Option<Self> {
        match self {
            Self::Heavy => Some(Self::Medium),
            Self::Medium => Some(Self::Light),
            Self::Light | Self::None => Option::None,
        }
    }
}

impl fmt::Display for BlanketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blanket category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for BlanketCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "heavy" => Ok(Self::Heavy),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Floor temperatures (°F, inclusive) of the three warmer tiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    pub none: f64,
    pub light: f64,
    pub medium: f64,
}

impl ThresholdTable {
    pub const OUT: Self = Self {
        none: 50.0,
        light: 40.0,
        medium: 30.0,
    };

    /// Sheltered horses: every tier 5°F colder than OUT
    pub const IN: Self = Self {
        none: 45.0,
        light: 35.0,
        medium: 25.0,
    };

    pub fn category(&self, feels_like: f64) -> BlanketCategory {
        if feels_like >= self.none {
            BlanketCategory::None
        } else if feels_like >= self.light {
            BlanketCategory::Light
        } else if feels_like >= self.medium {
            BlanketCategory::Medium
        } else {
            BlanketCategory::Heavy
        }
    }
}

/// Blanketing recommendation for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlanketingDecision {
    pub category: BlanketCategory,
    pub housing_status: HousingStatus,
    /// Temperature shown to stable hands as the deciding value
    pub effective_temp: f64,
    pub current_temp: f64,
    pub forecast_low: Option<f64>,
    pub has_temp_drop_alert: bool,
    pub temp_drop_amount: Option<f64>,
    pub step_down_applied: bool,
    pub reasoning: String,
}

/// Score of a single forecast period, kept for diagnostic listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodScore {
    pub time: String,
    pub name: String,
    pub feels_like: f64,
    pub score: u8,
    pub category: BlanketCategory,
    pub short_forecast: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAnalysis {
    /// Mean score of the scored periods, 0 when none could be scored
    pub average_score: f64,
    pub category: BlanketCategory,
    pub periods: Vec<PeriodScore>,
}

/// Threshold tables and alert limits driving the decisions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlanketingEngine {
    pub out: ThresholdTable,
    pub inside: ThresholdTable,
    /// A drop of at least this many °F raises the temperature drop alert
    pub drop_alert_threshold: f64,
    /// Weight of the current score in the blend
    pub current_weight: f64,
    /// Weight of the forecast average in the blend
    pub forecast_weight: f64,
}

impl BlanketingEngine {
    pub const DEFAULT: Self = Self {
        out: ThresholdTable::OUT,
        inside: ThresholdTable::IN,
        drop_alert_threshold: 10.0,
        current_weight: 0.3,
        forecast_weight: 0.7,
    };

    pub fn table(&self, housing: HousingStatus) -> &ThresholdTable {
        match housing {
            HousingStatus::Out => &self.out,
            HousingStatus::In => &self.inside,
        }
    }

    pub fn category_for_temp(&self, feels_like: f64, housing: HousingStatus) -> BlanketCategory {
        self.table(housing).category(feels_like)
    }

    pub fn score_for_temp(&self, feels_like: f64, housing: HousingStatus) -> u8 {
        self.category_for_temp(feels_like, housing).score()
    }

    /// Scores every period that has a feels-like value and averages them
    pub fn analyze_forecast(
        &self,
        periods: &[ForecastPeriod],
        housing: HousingStatus,
    ) -> ForecastAnalysis {
        let scored: Vec<PeriodScore> = periods
            .iter()
            .filter_map(|period| {
                let feels_like = period.feels_like?;
                let category = self.category_for_temp(feels_like, housing);
                Some(PeriodScore {
                    time: period.time.clone(),
                    name: period.name.clone(),
                    feels_like,
                    score: category.score(),
                    category,
                    short_forecast: period.short_forecast.clone(),
                })
            })
            .collect();

        if scored.is_empty() {
            return ForecastAnalysis {
                average_score: 0.0,
                category: BlanketCategory::None,
                periods: scored,
            };
        }

        let total: f64 = scored.iter().map(|p| f64::from(p.score)).sum();
        let average_score = total / scored.len() as f64;
        ForecastAnalysis {
            average_score,
            category: BlanketCategory::from_score(average_score),
            periods: scored,
        }
    }

    /// Blended score of current conditions and the forecast average.
    ///
    /// The trailing halving keeps the default blend just below 1.5, so the
    /// hourly path tops out at a light blanket unless the weights are raised.
    pub fn combined_score(&self, current_score: u8, forecast_average: f64) -> f64 {
        (f64::from(current_score) * self.current_weight + forecast_average * self.forecast_weight)
            / 2.0
    }

    /// Decides the blanket weight.
    ///
    /// With a non-empty `periods` slice the hourly blend is used and
    /// `forecast_low`, when absent, is taken from the coldest period. Without
    /// periods the legacy minimum-temperature rule applies.
    pub fn decide(
        &self,
        current_feels_like: f64,
        forecast_low: Option<f64>,
        housing: HousingStatus,
        periods: Option<&[ForecastPeriod]>,
    ) -> BlanketingDecision {
        match periods {
            Some(periods) if !periods.is_empty() => {
                self.decide_hourly(current_feels_like, forecast_low, housing, periods)
            }
            _ => self.decide_legacy(current_feels_like, forecast_low, housing),
        }
    }

    fn decide_hourly(
        &self,
        current_feels_like: f64,
        forecast_low: Option<f64>,
        housing: HousingStatus,
        periods: &[ForecastPeriod],
    ) -> BlanketingDecision {
        let current_score = self.score_for_temp(current_feels_like, housing);
        let current_category = BlanketCategory::from_score(f64::from(current_score));

        let analysis = self.analyze_forecast(periods, housing);
        let combined = self.combined_score(current_score, analysis.average_score);
        let mut category = BlanketCategory::from_score(combined);

        let forecast_low = forecast_low.or_else(|| min_feels_like(periods));
        let temp_drop_amount = forecast_low.map(|low| current_feels_like - low);
        let has_temp_drop_alert =
            temp_drop_amount.is_some_and(|drop| drop >= self.drop_alert_threshold);

        let mut step_down_applied = false;
        if has_temp_drop_alert {
            if let Some(lighter) = category.stepped_down() {
                category = lighter;
                step_down_applied = true;
            }
        }

        let effective_temp = match forecast_low {
            Some(low) if analysis.average_score > 0.0 => current_feels_like.min(low),
            _ => current_feels_like,
        };

        let reasoning = format!(
            "Hourly analysis: Current {current_category} ({current_score}), \
             Forecast avg {} ({:.1}), Combined {category} ({combined:.1})",
            analysis.category, analysis.average_score
        );

        BlanketingDecision {
            category,
            housing_status: housing,
            effective_temp,
            current_temp: current_feels_like,
            forecast_low,
            has_temp_drop_alert,
            temp_drop_amount,
            step_down_applied,
            reasoning,
        }
    }

    fn decide_legacy(
        &self,
        current_feels_like: f64,
        forecast_low: Option<f64>,
        housing: HousingStatus,
    ) -> BlanketingDecision {
        let effective_temp = forecast_low.map_or(current_feels_like, |low| current_feels_like.min(low));

        let current_category = self.category_for_temp(current_feels_like, housing);
        let mut category = self.category_for_temp(effective_temp, housing);

        let mut has_temp_drop_alert = false;
        let mut temp_drop_amount = None;
        let mut step_down_applied = false;
        let mut reasoning = String::new();

        if forecast_low.is_some() && current_feels_like > effective_temp {
            let drop = current_feels_like - effective_temp;
            temp_drop_amount = Some(drop);

            if drop >= self.drop_alert_threshold {
                has_temp_drop_alert = true;
                reasoning.push_str("Temperature drop detected");

                // only when the endpoints disagree on severity
                let cold_forecast = category >= BlanketCategory::Medium;
                let mild_now = current_category <= BlanketCategory::Light;
                if cold_forecast && mild_now {
                    if let Some(lighter) = category.stepped_down() {
                        category = lighter;
                        step_down_applied = true;
                        reasoning.push_str(" - stepped down blanket weight to prevent overheating");
                    }
                }
            }
        }

        BlanketingDecision {
            category,
            housing_status: housing,
            effective_temp,
            current_temp: current_feels_like,
            forecast_low,
            has_temp_drop_alert,
            temp_drop_amount,
            step_down_applied,
            reasoning,
        }
    }
}

impl Default for BlanketingEngine {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Coldest feels-like value among the periods that report one
pub fn min_feels_like(periods: &[ForecastPeriod]) -> Option<f64> {
    periods
        .iter()
        .filter_map(|p| p.feels_like)
        .fold(None, |low: Option<f64>, value| {
            Some(low.map_or(value, |low| low.min(value)))
        })
}

pub fn category_for_temp(feels_like: f64, housing: HousingStatus) -> BlanketCategory {
    BlanketingEngine::DEFAULT.category_for_temp(feels_like, housing)
}

pub fn score_for_temp(feels_like: f64, housing: HousingStatus) -> u8 {
    BlanketingEngine::DEFAULT.score_for_temp(feels_like, housing)
}

pub fn score_to_category(score: f64) -> BlanketCategory {
    BlanketCategory::from_score(score)
}

/// Decides blanketing with the default thresholds
pub fn decide_blanketing(
    current_feels_like: f64,
    forecast_low: Option<f64>,
    housing: HousingStatus,
    periods: Option<&[ForecastPeriod]>,
) -> BlanketingDecision {
    BlanketingEngine::DEFAULT.decide(current_feels_like, forecast_low, housing, periods)
}
