//! Recommendation options offered in each care phase.
//!
//! Morning care gets two options: a conservative one covering the day through
//! night care, and a normal one covering only the day. Day care gets a single
//! recommendation through night care, and night care one until midnight.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::blanketing::{BlanketingDecision, BlanketingEngine};
use crate::error::ProviderError;
use crate::housing::HousingStatus;
use crate::phase::{CarePhase, TargetPhase};
use crate::weather::ForecastPeriod;
use crate::window::{forecast_window_for, ForecastWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Primary,
    Alternative,
}

/// One way of looking ahead from the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOption {
    pub name: &'static str,
    pub emoji: &'static str,
    pub target: CarePhase,
    pub description: &'static str,
    pub priority: Priority,
}

const MORNING_OPTIONS: &[PlanOption] = &[
    PlanOption {
        name: "Conservative (until Night phase)",
        emoji: "🛡️",
        target: CarePhase::Night,
        description: "Covers until Night care",
        priority: Priority::Primary,
    },
    PlanOption {
        name: "Normal (until Day phase)",
        emoji: "⚡",
        target: CarePhase::Day,
        description: "Covers until Day care",
        priority: Priority::Alternative,
    },
];

const DAY_OPTIONS: &[PlanOption] = &[PlanOption {
    name: "Primary Recommendation",
    emoji: "🎯",
    target: CarePhase::Night,
    description: "Until next care phase",
    priority: Priority::Primary,
}];

/// Night care looks ahead to the end of the current night only
const NIGHT_OPTIONS: &[PlanOption] = &[PlanOption {
    name: "Primary Recommendation",
    emoji: "🎯",
    target: CarePhase::Night,
    description: "Until next care phase",
    priority: Priority::Primary,
}];

pub fn options_for(phase: CarePhase) -> &'static [PlanOption] {
    match phase {
        CarePhase::Morning => MORNING_OPTIONS,
        CarePhase::Day => DAY_OPTIONS,
        CarePhase::Night => NIGHT_OPTIONS,
    }
}

/// A plan option evaluated against the forecast
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRecommendation {
    pub option: PlanOption,
    pub decision: BlanketingDecision,
    pub window: ForecastWindow,
}

/// Evaluates every option of `phase`.
///
/// Alternatives whose category matches the primary recommendation are
/// dropped, since they would tell stable hands nothing new.
pub fn recommend(
    engine: &BlanketingEngine,
    phase: CarePhase,
    current_feels_like: f64,
    housing: HousingStatus,
    forecast: Result<&[ForecastPeriod], &ProviderError>,
    now_local: NaiveDateTime,
) -> Vec<PlanRecommendation> {
    let evaluated: Vec<PlanRecommendation> = options_for(phase)
        .iter()
        .map(|option| {
            let window = forecast_window_for(&TargetPhase::from(option.target), forecast, now_local);
            let decision =
                engine.decide(current_feels_like, None, housing, Some(window.periods()));
            PlanRecommendation {
                option: *option,
                decision,
                window,
            }
        })
        .collect();

    let primary_category = evaluated
        .iter()
        .find(|r| r.option.priority == Priority::Primary)
        .map(|r| r.decision.category);

    evaluated
        .into_iter()
        .filter(|r| {
            r.option.priority == Priority::Primary
                || primary_category.map_or(true, |category| r.decision.category != category)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blanketing::BlanketCategory;
    use chrono::NaiveDate;

    fn now(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn hour(hour: u32, feels_like: f64) -> ForecastPeriod {
        ForecastPeriod {
            time: format!("2024-01-15T{hour:02}:00:00-05:00"),
            feels_like: Some(feels_like),
            ..Default::default()
        }
    }

    #[test]
    fn every_phase_has_one_primary() {
        for phase in [CarePhase::Morning, CarePhase::Day, CarePhase::Night] {
            let primaries = options_for(phase)
                .iter()
                .filter(|o| o.priority == Priority::Primary)
                .count();
            assert_eq!(primaries, 1, "{phase}");
        }
        assert_eq!(options_for(CarePhase::Night)[0].target, CarePhase::Night);
        assert_eq!(options_for(CarePhase::Day)[0].target, CarePhase::Night);
    }

    #[test]
    fn morning_alternative_hidden_when_it_agrees() {
        let periods: Vec<_> = (7..24).map(|h| hour(h, 60.0)).collect();
        let plan = recommend(
            &BlanketingEngine::default(),
            CarePhase::Morning,
            60.0,
            HousingStatus::Out,
            Ok(periods.as_slice()),
            now(6),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].option.priority, Priority::Primary);
        assert_eq!(plan[0].decision.category, BlanketCategory::None);
    }

    #[test]
    fn morning_alternative_shown_when_evening_is_colder() {
        // warm through the day, bitter in the evening; raised weights so the
        // blend can reach the heavier tiers
        let engine = BlanketingEngine {
            current_weight: 0.6,
            forecast_weight: 1.4,
            ..BlanketingEngine::DEFAULT
        };
        let mut periods: Vec<_> = (7..16).map(|h| hour(h, 55.0)).collect();
        periods.extend((16..24).map(|h| hour(h, 5.0)));

        let plan = recommend(
            &engine,
            CarePhase::Morning,
            55.0,
            HousingStatus::Out,
            Ok(periods.as_slice()),
            now(6),
        );
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].option.target, CarePhase::Day);
        assert_eq!(plan[1].decision.category, BlanketCategory::None);
        assert_ne!(plan[0].decision.category, plan[1].decision.category);
        assert_eq!(plan[0].window.periods().len(), 17);
        assert_eq!(plan[1].window.periods().len(), 9);
    }

    #[test]
    fn failed_forecast_still_yields_a_recommendation() {
        let err = ProviderError::RateLimited {
            provider: "Weather.gov",
        };
        let plan = recommend(
            &BlanketingEngine::default(),
            CarePhase::Night,
            35.0,
            HousingStatus::Out,
            Err(&err),
            now(20),
        );
        assert_eq!(plan.len(), 1);
        assert!(!plan[0].window.is_available());
        assert_eq!(plan[0].decision.category, BlanketCategory::Medium);
        assert_eq!(plan[0].decision.forecast_low, None);
    }

    #[test]
    fn night_window_stops_at_midnight() {
        let mut periods: Vec<_> = (20..24).map(|h| hour(h, 30.0)).collect();
        periods.push(ForecastPeriod {
            time: "2024-01-16T06:00:00-05:00".to_string(),
            feels_like: Some(5.0),
            ..Default::default()
        });

        let plan = recommend(
            &BlanketingEngine::default(),
            CarePhase::Night,
            30.0,
            HousingStatus::Out,
            Ok(periods.as_slice()),
            now(20),
        );
        let end = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(plan[0].window.ends_at(), Some(end));
        assert_eq!(plan[0].window.periods().len(), 4);
        assert_eq!(plan[0].decision.forecast_low, Some(30.0));
    }
}
