use chrono::NaiveDateTime;

use crate::blanketing::BlanketingDecision;
use crate::care::CareInstructions;
use crate::housing::HousingDecision;
use crate::nws::NwsForecast;
use crate::phase::CarePhase;
use crate::plan::{PlanRecommendation, Priority};
use crate::weather::{ForecastPeriod, WeatherReading};
use crate::window::{parse_period_time, ForecastWindow};

fn period_label(period: &ForecastPeriod) -> String {
    parse_period_time(&period.time)
        .map(|time| time.format("%a %H:%M").to_string())
        .unwrap_or_else(|| period.time.clone())
}

fn degrees(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}\u{00b0}F"))
}

/// Formats current conditions with their source
pub fn format_reading(reading: &WeatherReading) -> String {
    let mut output = format!(
        "Current Conditions ({})\n  Source: {}\n  Temperature: {:.1}\u{00b0}F\n  Feels Like: {:.1}\u{00b0}F\n",
        reading.station_name,
        reading.source.description(),
        reading.temperature,
        reading.effective_feels_like()
    );
    if let Some(humidity) = reading.humidity {
        output.push_str(&format!("  Humidity: {humidity:.0}%\n"));
    }
    if let Some(timestamp) = &reading.timestamp {
        output.push_str(&format!("  Updated: {timestamp}\n"));
    }
    output
}

/// Formats a housing decision
pub fn format_housing(decision: &HousingDecision) -> String {
    let mut output = format!("Housing: {}\n  Reason: {}\n", decision.status, decision.reason);
    if decision.user_selectable {
        output.push_str("  Stable hands may choose IN or OUT.\n");
    } else {
        output.push_str("  Weather requires horses to stay IN.\n");
    }
    output
}

/// Formats care instructions for a blanket category
pub fn format_care_instructions(care: &CareInstructions) -> String {
    let mut output = format!(
        "{} {}\n  Horses: {}\n  Donkeys: {}\n",
        care.emoji, care.title, care.horses, care.donkeys
    );
    if !care.care_notes.is_empty() {
        output.push_str("  Care Notes:\n");
        for note in &care.care_notes {
            output.push_str(&format!("    - {note}\n"));
        }
    }
    output
}

/// Formats a blanketing decision followed by its care instructions
pub fn format_blanketing(decision: &BlanketingDecision, care: &CareInstructions) -> String {
    let mut output = format!(
        "Blanketing: {} ({})\n  Effective Temperature: {:.1}\u{00b0}F\n  Current Feels Like: {:.1}\u{00b0}F\n  Forecast Low: {}\n",
        decision.category,
        decision.housing_status,
        decision.effective_temp,
        decision.current_temp,
        degrees(decision.forecast_low)
    );
    if decision.has_temp_drop_alert {
        if let Some(drop) = decision.temp_drop_amount {
            output.push_str(&format!(
                "  Temperature Drop Alert: {drop:.1}\u{00b0}F expected\n"
            ));
        }
    }
    if decision.step_down_applied {
        output.push_str("  Blanket weight stepped down to prevent overheating\n");
    }
    output.push_str(&format!("  Reasoning: {}\n\n", decision.reasoning));
    output.push_str(&format_care_instructions(care));
    output
}

/// Formats the periods that carry a feels-like value, one per line
pub fn format_timeline(periods: &[ForecastPeriod]) -> String {
    let lines: Vec<String> = periods
        .iter()
        .filter_map(|period| {
            let feels_like = period.feels_like?;
            Some(format!(
                "  {}: {:.1}\u{00b0}F, {}",
                period_label(period),
                feels_like,
                period.short_forecast
            ))
        })
        .collect();

    if lines.is_empty() {
        return "  No forecast data in this window.\n".to_string();
    }
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn format_window(window: &ForecastWindow) -> String {
    match window {
        ForecastWindow::Selected { periods, ends_at } => format!(
            "  Forecast until {}:\n{}",
            ends_at.format("%a %H:%M"),
            format_timeline(periods)
        ),
        ForecastWindow::Unavailable { reason } => {
            format!("  Forecast unavailable: {reason}\n")
        }
    }
}

/// Formats the current care phase
pub fn format_care_phase(phase: CarePhase, now_local: NaiveDateTime, timezone: &str) -> String {
    format!(
        "Care Phase: {}\n  {}\n  Local Time: {} ({})\n",
        phase,
        phase.description(),
        now_local.format("%Y-%m-%d %H:%M"),
        timezone
    )
}

/// Formats the recommendation options of a care phase
pub fn format_plan(phase: CarePhase, plan: &[PlanRecommendation]) -> String {
    let mut output = format!("{phase} Care Recommendations\n\n");
    for recommendation in plan {
        let option = &recommendation.option;
        let decision = &recommendation.decision;
        let tag = match option.priority {
            Priority::Primary => "",
            Priority::Alternative => " [alternative]",
        };
        output.push_str(&format!(
            "{} {}{}\n  {}\n  Blanket: {} ({:.1}\u{00b0}F effective)\n  Reasoning: {}\n",
            option.emoji,
            option.name,
            tag,
            option.description,
            decision.category,
            decision.effective_temp,
            decision.reasoning
        ));
        output.push_str(&format_window(&recommendation.window));
        output.push('\n');
    }
    output
}

/// Formats the 24-hour forecast as a table
pub fn format_forecast_table(forecast: &NwsForecast) -> String {
    let location = &forecast.location;
    let mut output = format!(
        "24-Hour Forecast for {} (office {})\n",
        location.label(),
        location.office
    );
    if let Some(timezone) = &location.timezone {
        output.push_str(&format!("Timezone: {timezone}\n"));
    }
    output.push('\n');

    if forecast.periods.is_empty() {
        output.push_str("No forecast periods available.\n");
        return output;
    }

    output.push_str(&format!(
        "{:<10} {:>7} {:>10} {:>8} {:>6} {:>6}  {}\n",
        "Time", "Temp", "Feels Like", "Humidity", "Wind", "Rain", "Conditions"
    ));
    for period in &forecast.periods {
        output.push_str(&format!(
            "{:<10} {:>7} {:>10} {:>7}% {:>6} {:>5}%  {}\n",
            period_label(period),
            degrees(period.temperature),
            degrees(period.feels_like),
            period.humidity.map_or(0.0, |h| h.round()),
            format!("{:.0} mph", period.wind_mph),
            period.precipitation_chance,
            period.short_forecast
        ));
    }
    output
}
