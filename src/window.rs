//! Selection of the forecast periods that fall inside a care phase.
//!
//! Period timestamps and the phase boundary are both compared as naive
//! wall-clock values. A period stamped `18:00-05:00` counts as 18:00 no matter
//! what zone the boundary was computed in. Around a DST change this can place
//! an hour on the wrong side of the boundary.

use chrono::{DateTime, NaiveDateTime};

use crate::blanketing::min_feels_like;
use crate::error::ProviderError;
use crate::phase::{target_phase_end_time, TargetPhase};
use crate::weather::ForecastPeriod;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Forecast periods selected for a target phase
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastWindow {
    /// Periods up to and including `ends_at`; may be empty when nothing matched
    Selected {
        periods: Vec<ForecastPeriod>,
        ends_at: NaiveDateTime,
    },
    /// The forecast could not be fetched
    Unavailable { reason: String },
}

impl ForecastWindow {
    pub fn periods(&self) -> &[ForecastPeriod] {
        match self {
            Self::Selected { periods, .. } => periods,
            Self::Unavailable { .. } => &[],
        }
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Selected { ends_at, .. } => Some(*ends_at),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Selected { .. })
    }

    /// Coldest feels-like value in the window
    pub fn min_feels_like(&self) -> Option<f64> {
        min_feels_like(self.periods())
    }
}

/// Wall-clock time of a provider timestamp, ignoring any offset it carries
pub fn parse_period_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Periods at or before the end of `target`, in their original order.
///
/// Periods whose timestamp cannot be parsed are skipped.
pub fn window_until(
    target: &TargetPhase,
    periods: &[ForecastPeriod],
    now_local: NaiveDateTime,
) -> (Vec<ForecastPeriod>, NaiveDateTime) {
    let ends_at = target_phase_end_time(target, now_local);
    let selected = periods
        .iter()
        .filter(|period| parse_period_time(&period.time).is_some_and(|time| time <= ends_at))
        .cloned()
        .collect();
    (selected, ends_at)
}

/// Window for a fetched forecast, or `Unavailable` when the fetch failed
pub fn forecast_window_for(
    target: &TargetPhase,
    forecast: Result<&[ForecastPeriod], &ProviderError>,
    now_local: NaiveDateTime,
) -> ForecastWindow {
    match forecast {
        Ok(periods) => {
            let (periods, ends_at) = window_until(target, periods, now_local);
            ForecastWindow::Selected { periods, ends_at }
        }
        Err(err) => ForecastWindow::Unavailable {
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::CarePhase;
    use chrono::NaiveDate;

    fn now(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn period(time: &str, feels_like: Option<f64>) -> ForecastPeriod {
        ForecastPeriod {
            time: time.to_string(),
            feels_like,
            ..Default::default()
        }
    }

    fn hourly_from(start: &str, hours: u32) -> Vec<ForecastPeriod> {
        let start = parse_period_time(start).unwrap();
        (0..hours)
            .map(|h| {
                let time = start + chrono::Duration::hours(i64::from(h));
                period(
                    &format!("{}-05:00", time.format("%Y-%m-%dT%H:%M:%S")),
                    Some(40.0 - f64::from(h)),
                )
            })
            .collect()
    }

    #[test]
    fn parses_offsets_as_wall_clock() {
        assert_eq!(
            parse_period_time("2024-01-15T18:00:00-05:00"),
            Some(now(18, 0))
        );
        assert_eq!(parse_period_time("2024-01-15T18:00:00Z"), Some(now(18, 0)));
        assert_eq!(parse_period_time("2024-01-15T18:00"), Some(now(18, 0)));
        assert_eq!(parse_period_time("tonight"), None);
        assert_eq!(parse_period_time(""), None);
    }

    #[test]
    fn morning_window_stops_at_eleven() {
        let periods = hourly_from("2024-01-15T06:00:00", 24);
        let (selected, ends_at) =
            window_until(&CarePhase::Morning.into(), &periods, now(5, 30));
        assert_eq!(ends_at, now(11, 0));
        // 06:00 through 11:00 inclusive
        assert_eq!(selected.len(), 6);
        assert_eq!(selected.last().unwrap().time, "2024-01-15T11:00:00-05:00");
    }

    #[test]
    fn night_window_runs_to_midnight() {
        let periods = hourly_from("2024-01-15T16:00:00", 24);
        let (selected, _) = window_until(&CarePhase::Night.into(), &periods, now(15, 55));
        // 16:00 through 23:00
        assert_eq!(selected.len(), 8);
    }

    #[test]
    fn unparsable_periods_are_skipped() {
        let periods = vec![
            period("2024-01-15T07:00:00-05:00", Some(30.0)),
            period("not a time", Some(10.0)),
            period("", Some(5.0)),
            period("2024-01-15T08:00:00-05:00", Some(28.0)),
        ];
        let (selected, _) = window_until(&CarePhase::Morning.into(), &periods, now(6, 0));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1].feels_like, Some(28.0));
    }

    #[test]
    fn order_is_preserved() {
        let periods = hourly_from("2024-01-15T12:00:00", 4);
        let (selected, _) = window_until(&CarePhase::Day.into(), &periods, now(11, 30));
        let times: Vec<_> = selected.iter().map(|p| p.time.clone()).collect();
        let expected: Vec<_> = periods.iter().map(|p| p.time.clone()).collect();
        assert_eq!(times, expected);
    }

    #[test]
    fn window_reduces_to_min_feels_like() {
        let periods = vec![
            period("2024-01-15T07:00:00-05:00", Some(30.0)),
            period("2024-01-15T08:00:00-05:00", None),
            period("2024-01-15T09:00:00-05:00", Some(24.5)),
            period("2024-01-15T13:00:00-05:00", Some(12.0)),
        ];
        let window = forecast_window_for(&CarePhase::Morning.into(), Ok(periods.as_slice()), now(6, 0));
        assert!(window.is_available());
        assert_eq!(window.periods().len(), 3);
        assert_eq!(window.min_feels_like(), Some(24.5));
        assert_eq!(window.ends_at(), Some(now(11, 0)));
    }

    #[test]
    fn empty_match_differs_from_provider_failure() {
        let later = vec![period("2024-01-17T07:00:00-05:00", Some(30.0))];
        let window = forecast_window_for(&CarePhase::Morning.into(), Ok(later.as_slice()), now(6, 0));
        assert!(window.is_available());
        assert!(window.periods().is_empty());

        let err = ProviderError::Status {
            provider: "Weather.gov",
            status: 500,
        };
        let window = forecast_window_for(&CarePhase::Morning.into(), Err(&err), now(6, 0));
        assert!(!window.is_available());
        assert!(window.periods().is_empty());
        assert_eq!(window.ends_at(), None);
        assert_eq!(window.min_feels_like(), None);
    }
}
