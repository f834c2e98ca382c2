//! Care phases of the stable day and their boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Local, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Morning care starts at 4:30
const MORNING_START: u32 = 4 * 60 + 30;
/// Day care starts at 11:00
const DAY_START: u32 = 11 * 60;
/// Night care starts at 15:50
const NIGHT_START: u32 = 15 * 60 + 50;

/// Daily window during which one blanketing decision holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CarePhase {
    Morning,
    Day,
    Night,
}

impl CarePhase {
    /// Phase containing the given local wall-clock time
    pub fn at(now_local: NaiveDateTime) -> Self {
        let minute_of_day = now_local.hour() * 60 + now_local.minute();
        if minute_of_day < MORNING_START {
            Self::Night
        } else if minute_of_day < DAY_START {
            Self::Morning
        } else if minute_of_day < NIGHT_START {
            Self::Day
        } else {
            Self::Night
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Day => "Day",
            Self::Night => "Night",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Morning => "Early care period",
            Self::Day => "Midday monitoring period",
            Self::Night => "Night care period",
        }
    }
}

impl fmt::Display for CarePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase a forecast lookup should run until.
///
/// Free-text targets that name no known phase are kept as `Other` and fall
/// back to the next morning boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPhase {
    Phase(CarePhase),
    Other(String),
}

impl From<CarePhase> for TargetPhase {
    fn from(phase: CarePhase) -> Self {
        Self::Phase(phase)
    }
}

impl FromStr for TargetPhase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let phase = match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Self::Phase(CarePhase::Morning),
            "day" => Self::Phase(CarePhase::Day),
            "night" => Self::Phase(CarePhase::Night),
            _ => Self::Other(s.to_string()),
        };
        Ok(phase)
    }
}

/// Phase for `now_local`, or for the system clock when no local time is known
pub fn current_care_phase(now_local: Option<NaiveDateTime>) -> CarePhase {
    CarePhase::at(now_local.unwrap_or_else(|| Local::now().naive_local()))
}

/// End of the target phase as a local wall-clock time.
///
/// Morning and Day roll over to tomorrow once today's boundary has passed.
/// Night always ends just before midnight today, since night care happens
/// late in the evening rather than at the following morning boundary.
pub fn target_phase_end_time(target: &TargetPhase, now_local: NaiveDateTime) -> NaiveDateTime {
    let today = now_local.date();
    // boundaries are fixed valid times, so the fallback never applies
    let at = |minutes: u32, second: u32| {
        today
            .and_hms_opt(minutes / 60, minutes % 60, second)
            .unwrap_or(now_local)
    };
    let rolled = |end: NaiveDateTime| {
        if now_local >= end {
            end + Duration::days(1)
        } else {
            end
        }
    };

    match target {
        TargetPhase::Phase(CarePhase::Morning) => rolled(at(DAY_START, 0)),
        TargetPhase::Phase(CarePhase::Day) => rolled(at(NIGHT_START, 0)),
        TargetPhase::Phase(CarePhase::Night) => at(23 * 60 + 59, 59),
        TargetPhase::Other(_) => at(DAY_START, 0) + Duration::days(1),
    }
}

/// Parses an IANA zone name, defaulting to UTC when absent or unknown
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {name:?}, falling back to UTC");
            Tz::UTC
        }),
        None => Tz::UTC,
    }
}

/// Current wall-clock time in the given zone
pub fn local_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}
