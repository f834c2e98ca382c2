use anyhow::Result;
use chrono_tz::Tz;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;

use crate::ambient::AmbientClient;
use crate::blanketing::BlanketingEngine;
use crate::care::{care_instructions_for, CareInstructions};
use crate::config::{Location, StablemanConfig};
use crate::error::ProviderError;
use crate::formatters::{
    format_blanketing, format_care_instructions, format_care_phase, format_forecast_table,
    format_housing, format_plan, format_reading,
};
use crate::housing::HousingRules;
use crate::models::{BlanketingRequest, CareInstructionsRequest, LocationRequest};
use crate::nws::NwsClient;
use crate::phase::{local_now, resolve_timezone, CarePhase, TargetPhase};
use crate::plan::{recommend, Priority};
use crate::sources::{Cached, CurrentConditions, FallbackConditions, ForecastSource};
use crate::window::forecast_window_for;

/// Stable care service that handles MCP requests
#[derive(Clone)]
pub struct Stableman {
    config: Arc<StablemanConfig>,
    conditions: Arc<dyn CurrentConditions>,
    forecasts: Arc<dyn ForecastSource>,
    engine: BlanketingEngine,
    housing_rules: HousingRules,
    tool_router: ToolRouter<Self>,
}

impl Stableman {
    /// Creates the service with live, cached providers
    pub fn new(config: StablemanConfig) -> Result<Self> {
        let forecasts: Arc<dyn ForecastSource> =
            Arc::new(Cached::forecasts(NwsClient::new(&config)?));

        let station: Option<Arc<dyn CurrentConditions>> = match AmbientClient::new(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(err) => {
                tracing::warn!("Weather station disabled: {}", err);
                None
            }
        };
        let conditions: Arc<dyn CurrentConditions> = Arc::new(Cached::readings(
            FallbackConditions::new(station, forecasts.clone()),
        ));

        Ok(Self::with_sources(config, conditions, forecasts))
    }

    /// Creates the service over the given sources
    pub fn with_sources(
        config: StablemanConfig,
        conditions: Arc<dyn CurrentConditions>,
        forecasts: Arc<dyn ForecastSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            conditions,
            forecasts,
            engine: BlanketingEngine::DEFAULT,
            housing_rules: HousingRules::DEFAULT,
            tool_router: Self::tool_router(),
        }
    }

    /// Location of a request, defaulting to the configured one
    fn location(&self, request: &LocationRequest) -> Result<Location, McpError> {
        let default = self.config.location;
        Location::new(
            request.latitude.unwrap_or(default.latitude),
            request.longitude.unwrap_or(default.longitude),
        )
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
    }

    /// Request zone, then the configured zone, then the one Weather.gov reports
    async fn timezone(&self, request: &LocationRequest, location: Location) -> Tz {
        if let Some(name) = request.timezone.as_deref().or(self.config.timezone.as_deref()) {
            return resolve_timezone(Some(name));
        }
        let reported = match self.forecasts.forecast(location).await {
            Ok(forecast) => forecast.location.timezone,
            Err(_) => None,
        };
        resolve_timezone(reported.as_deref())
    }

    /// Maps provider failures onto MCP errors
    fn provider_error(context: &str, err: ProviderError) -> McpError {
        match &err {
            ProviderError::Status { status: 404, .. } => McpError::invalid_params(
                "Location not found in NWS coverage area. This location may be outside the US or in waters not covered by the grid system.",
                None,
            ),
            _ if err.is_configuration() => {
                McpError::invalid_params(format!("{context}: {err}"), None)
            }
            _ if err.is_rate_limited() => McpError::internal_error(
                format!("{context}: weather data is rate limited, try again shortly ({err})"),
                None,
            ),
            _ => McpError::internal_error(format!("{context}: {err}"), None),
        }
    }
}

#[tool_handler]
impl ServerHandler for Stableman {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "stableman".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Horse blanketing and housing assistant. Combines a personal weather station \
                with the National Weather Service hourly forecast to recommend blanket weights \
                and whether horses should stay in the barn for the current care phase."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Stableman {
    /// Recommends blanket weights for the current care phase
    #[tool(description = "Get the blanketing recommendation for the current care phase (Morning, Day or Night). Uses current conditions and the hourly forecast until the next care phase. Optional latitude/longitude and IANA timezone; housing may be set to \"IN\" or \"OUT\" when weather allows a choice.")]
    async fn get_blanketing_recommendation(
        &self,
        Parameters(request): Parameters<BlanketingRequest>,
    ) -> Result<CallToolResult, McpError> {
        let location = self.location(&request.location)?;
        tracing::info!(
            "Getting blanketing recommendation for {}, {}",
            location.latitude,
            location.longitude
        );

        let reading = self
            .conditions
            .current_reading(location)
            .await
            .map_err(|e| Self::provider_error("Failed to fetch current conditions", e))?;

        let forecast = self.forecasts.forecast(location).await;
        if let Err(err) = &forecast {
            tracing::warn!("Forecast unavailable: {}", err);
        }
        let periods = forecast.as_ref().map(|f| f.periods.as_slice());

        let tz = self.timezone(&request.location, location).await;
        let now_local = local_now(tz);
        let phase = CarePhase::at(now_local);

        let window = forecast_window_for(&TargetPhase::from(phase), periods, now_local);
        let mut housing = self.housing_rules.resolve(Some(&reading), window.periods());
        if let Some(choice) = request.housing {
            if housing.user_selectable {
                housing.status = choice;
            } else if choice != housing.status {
                tracing::info!("Ignoring housing override: {}", housing.reason);
            }
        }

        let plan = recommend(
            &self.engine,
            phase,
            reading.effective_feels_like(),
            housing.status,
            periods,
            now_local,
        );

        let mut output = format_reading(&reading);
        output.push('\n');
        output.push_str(&format_housing(&housing));
        output.push('\n');
        if let Some(primary) = plan.iter().find(|r| r.option.priority == Priority::Primary) {
            let care = CareInstructions::for_category(primary.decision.category, housing.status);
            output.push_str(&format_blanketing(&primary.decision, &care));
            output.push('\n');
        }
        output.push_str(&format_plan(phase, &plan));

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// Decides whether horses go out or stay in
    #[tool(description = "Get the housing status (Horses IN or Horses OUT) from current heat index and forecast rain until the end of the current care phase. Optional latitude/longitude and IANA timezone.")]
    async fn get_housing_status(
        &self,
        Parameters(request): Parameters<LocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        let location = self.location(&request)?;
        tracing::info!(
            "Getting housing status for {}, {}",
            location.latitude,
            location.longitude
        );

        let reading = match self.conditions.current_reading(location).await {
            Ok(reading) => Some(reading),
            Err(err) => {
                tracing::warn!("No current conditions for housing: {}", err);
                None
            }
        };
        let forecast = self.forecasts.forecast(location).await;
        let periods = forecast.as_ref().map(|f| f.periods.as_slice());

        let tz = self.timezone(&request, location).await;
        let now_local = local_now(tz);
        let phase = CarePhase::at(now_local);
        let window = forecast_window_for(&TargetPhase::from(phase), periods, now_local);

        let decision = self.housing_rules.resolve(reading.as_ref(), window.periods());

        Ok(CallToolResult::success(vec![Content::text(format_housing(
            &decision,
        ))]))
    }

    /// Reports the care phase at the stable's local time
    #[tool(description = "Get the current care phase (Morning 4:30-11:00, Day 11:00-15:50, Night otherwise). Optional IANA timezone; defaults to the configured or forecast-reported zone.")]
    async fn get_care_phase(
        &self,
        Parameters(request): Parameters<LocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        let location = self.location(&request)?;
        let tz = self.timezone(&request, location).await;
        let now_local = local_now(tz);
        let phase = CarePhase::at(now_local);
        tracing::info!("Care phase in {}: {}", tz.name(), phase);

        Ok(CallToolResult::success(vec![Content::text(
            format_care_phase(phase, now_local, tz.name()),
        )]))
    }

    /// Lists the next 24 hours of the forecast
    #[tool(description = "Get the 24-hour hourly forecast from the National Weather Service with feels-like temperatures. Optional latitude/longitude (US locations only).")]
    async fn get_hourly_forecast(
        &self,
        Parameters(request): Parameters<LocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        let location = self.location(&request)?;
        tracing::info!(
            "Getting hourly forecast for {}, {}",
            location.latitude,
            location.longitude
        );

        let forecast = self
            .forecasts
            .forecast(location)
            .await
            .map_err(|e| Self::provider_error("Failed to fetch forecast", e))?;

        Ok(CallToolResult::success(vec![Content::text(
            format_forecast_table(&forecast),
        )]))
    }

    /// Looks up care instructions for a blanket category
    #[tool(description = "Get care instructions for a blanket category (none, light, medium, heavy) and housing status (IN or OUT). Unrecognized categories get the no-blanket instructions.")]
    async fn get_care_instructions(
        &self,
        Parameters(request): Parameters<CareInstructionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting care instructions for {} ({})",
            request.category,
            request.housing
        );

        let care = care_instructions_for(&request.category, request.housing);

        Ok(CallToolResult::success(vec![Content::text(
            format_care_instructions(&care),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nws::{LocationInfo, NwsForecast};
    use crate::weather::{ForecastPeriod, ReadingSource, WeatherReading};
    use async_trait::async_trait;

    struct FixedConditions(Result<WeatherReading, ()>);

    #[async_trait]
    impl CurrentConditions for FixedConditions {
        async fn current_reading(&self, _: Location) -> Result<WeatherReading, ProviderError> {
            self.0.clone().map_err(|_| ProviderError::Status {
                provider: "AmbientWeather.net",
                status: 500,
            })
        }
    }

    const EARLIER: &str = "2024-01-15T18:00:00-05:00";
    const FAR_AHEAD: &str = "2099-01-15T18:00:00-05:00";

    struct FixedForecast {
        status: Option<u16>,
        timezone: Option<&'static str>,
        rain: u8,
        time: &'static str,
    }

    #[async_trait]
    impl ForecastSource for FixedForecast {
        async fn forecast(&self, location: Location) -> Result<NwsForecast, ProviderError> {
            if let Some(status) = self.status {
                return Err(ProviderError::Status {
                    provider: "Weather.gov",
                    status,
                });
            }
            Ok(NwsForecast {
                location: LocationInfo {
                    city: "Lexington".to_string(),
                    state: "KY".to_string(),
                    office: "LMK".to_string(),
                    timezone: self.timezone.map(str::to_string),
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
                periods: vec![ForecastPeriod {
                    time: self.time.to_string(),
                    temperature: Some(38.0),
                    feels_like: Some(33.0),
                    precipitation_chance: self.rain,
                    short_forecast: "Partly Cloudy".to_string(),
                    ..Default::default()
                }],
            })
        }
    }

    fn reading() -> WeatherReading {
        WeatherReading {
            temperature: 40.0,
            feels_like: Some(36.0),
            humidity: Some(70.0),
            timestamp: None,
            station_name: "Weather Station (AA:BB)".to_string(),
            source: ReadingSource::Ambient,
        }
    }

    fn service(conditions: FixedConditions, forecast: FixedForecast) -> Stableman {
        Stableman::with_sources(
            StablemanConfig::default(),
            Arc::new(conditions),
            Arc::new(forecast),
        )
    }

    fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.raw.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn coverage_errors_are_invalid_params() {
        let err = Stableman::provider_error(
            "Failed to fetch forecast",
            ProviderError::Status {
                provider: "Weather.gov",
                status: 404,
            },
        );
        assert!(err.message.contains("NWS coverage area"));
    }

    #[test]
    fn rate_limits_are_reported_as_such() {
        let err = Stableman::provider_error(
            "Failed to fetch current conditions",
            ProviderError::RateLimited {
                provider: "AmbientWeather.net",
            },
        );
        assert!(err.message.contains("rate limited"));
    }

    #[tokio::test]
    async fn rejects_out_of_range_coordinates() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: None,
                timezone: None,
                rain: 0,
                time: EARLIER,
            },
        );
        let request = LocationRequest {
            latitude: Some(120.0),
            ..Default::default()
        };
        assert!(svc.get_hourly_forecast(Parameters(request)).await.is_err());
    }

    #[tokio::test]
    async fn housing_is_forced_in_by_rain() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: None,
                timezone: None,
                rain: 60,
                time: EARLIER,
            },
        );
        let result = svc
            .get_housing_status(Parameters(LocationRequest::default()))
            .await
            .unwrap();
        let output = text(&result);
        assert!(output.contains("Horses IN"));
        assert!(output.contains("Rain expected (60% chance)"));
    }

    #[tokio::test]
    async fn housing_without_data_defaults_out() {
        let svc = service(
            FixedConditions(Err(())),
            FixedForecast {
                status: Some(503),
                timezone: None,
                rain: 0,
                time: EARLIER,
            },
        );
        let result = svc
            .get_housing_status(Parameters(LocationRequest::default()))
            .await
            .unwrap();
        assert!(text(&result).contains("No weather data available"));
    }

    #[tokio::test]
    async fn blanketing_survives_forecast_failure() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: Some(503),
                timezone: None,
                rain: 0,
                time: EARLIER,
            },
        );
        let result = svc
            .get_blanketing_recommendation(Parameters(BlanketingRequest::default()))
            .await
            .unwrap();
        let output = text(&result);
        assert!(output.contains("Forecast unavailable"));
        // 36°F feels-like, horses out: medium without a forecast
        assert!(output.contains("Blanketing: medium (Horses OUT)"));
    }

    #[tokio::test]
    async fn blanketing_requires_current_conditions() {
        let svc = service(
            FixedConditions(Err(())),
            FixedForecast {
                status: None,
                timezone: None,
                rain: 0,
                time: EARLIER,
            },
        );
        let result = svc
            .get_blanketing_recommendation(Parameters(BlanketingRequest::default()))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn housing_override_applies_when_selectable() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: Some(503),
                timezone: None,
                rain: 0,
                time: EARLIER,
            },
        );
        let request = BlanketingRequest {
            housing: Some(crate::housing::HousingStatus::In),
            ..Default::default()
        };
        let output = text(
            &svc.get_blanketing_recommendation(Parameters(request))
                .await
                .unwrap(),
        );
        assert!(output.contains("Housing: Horses IN"));
        // IN thresholds: 36°F is light
        assert!(output.contains("Blanketing: light (Horses IN)"));
    }

    #[tokio::test]
    async fn care_phase_uses_reported_timezone() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: None,
                timezone: Some("America/New_York"),
                rain: 0,
                time: EARLIER,
            },
        );
        let output = text(
            &svc.get_care_phase(Parameters(LocationRequest::default()))
                .await
                .unwrap(),
        );
        assert!(output.starts_with("Care Phase: "));
        assert!(output.contains("(America/New_York)"));
    }

    #[tokio::test]
    async fn care_instructions_follow_category() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: None,
                timezone: None,
                rain: 0,
                time: EARLIER,
            },
        );
        let request = CareInstructionsRequest {
            category: "Heavy".to_string(),
            housing: crate::housing::HousingStatus::Out,
        };
        let output = text(&svc.get_care_instructions(Parameters(request)).await.unwrap());
        let care = CareInstructions::for_category(
            crate::blanketing::BlanketCategory::Heavy,
            crate::housing::HousingStatus::Out,
        );
        assert!(output.contains(care.title));
    }

    #[tokio::test]
    async fn unknown_care_category_gets_no_blanket_entry() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: None,
                timezone: None,
                rain: 0,
                time: EARLIER,
            },
        );
        let request = CareInstructionsRequest {
            category: "quilted".to_string(),
            housing: crate::housing::HousingStatus::In,
        };
        let output = text(&svc.get_care_instructions(Parameters(request)).await.unwrap());
        let none = CareInstructions::for_category(
            crate::blanketing::BlanketCategory::None,
            crate::housing::HousingStatus::In,
        );
        assert!(output.contains(none.title));
    }

    #[tokio::test]
    async fn rain_after_the_phase_ends_leaves_horses_out() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: None,
                timezone: None,
                rain: 60,
                time: FAR_AHEAD,
            },
        );
        let output = text(
            &svc.get_housing_status(Parameters(LocationRequest::default()))
                .await
                .unwrap(),
        );
        assert!(output.contains("Housing: Horses OUT"));
        assert!(!output.contains("Rain expected"));
    }

    #[tokio::test]
    async fn blanketing_ignores_rain_after_the_phase_ends() {
        let svc = service(
            FixedConditions(Ok(reading())),
            FixedForecast {
                status: None,
                timezone: None,
                rain: 60,
                time: FAR_AHEAD,
            },
        );
        let output = text(
            &svc.get_blanketing_recommendation(Parameters(BlanketingRequest::default()))
                .await
                .unwrap(),
        );
        assert!(output.contains("Housing: Horses OUT"));
        // 36°F feels-like on the OUT table with an empty window
        assert!(output.contains("Blanketing: medium (Horses OUT)"));
    }
}
