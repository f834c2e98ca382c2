//! Horse blanketing and housing decisions for a small stable.
//!
//! The core modules are pure: [`feels_like`], [`housing`], [`blanketing`],
//! [`phase`], [`window`], [`care`] and [`plan`] only compute. Weather comes in
//! through [`nws`] and [`ambient`], combined by [`sources`], and the MCP
//! server in [`service`] ties everything together.

pub mod ambient;
pub mod blanketing;
pub mod care;
pub mod config;
pub mod constants;
pub mod error;
pub mod feels_like;
pub mod formatters;
pub mod housing;
mod http;
pub mod models;
pub mod nws;
pub mod phase;
pub mod plan;
pub mod service;
pub mod sources;
pub mod weather;
pub mod window;

pub use blanketing::{decide_blanketing, BlanketCategory, BlanketingDecision, BlanketingEngine};
pub use config::{Location, StablemanConfig};
pub use error::{ConfigError, ProviderError};
pub use housing::{resolve_housing_status, HousingDecision, HousingStatus};
pub use phase::{current_care_phase, target_phase_end_time, CarePhase, TargetPhase};
pub use service::Stableman;
pub use weather::{ForecastPeriod, WeatherReading};
pub use window::{forecast_window_for, ForecastWindow};
