//! Core library for the `geoweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and its error taxonomy
//! - Collaborator traits for location and connectivity
//! - The location-triggered fetch workflow
//! - Pure helpers for unit suffixes and condition icons
//!
//! It is used by `geoweather-cli`, but can also be embedded in other front-ends.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod provider;
pub mod units;
pub mod workflow;

pub use config::{Config, LocationConfig};
pub use connectivity::{AssumeOnline, ConnectivityChecker, SystemConnectivity};
pub use error::{ClientErrorKind, WeatherError};
pub use icon::{IconId, icon_for};
pub use location::{FixedLocation, LocationProvider};
pub use model::{Coordinate, UnitSystem, WeatherQuery, WeatherReport};
pub use provider::{WeatherClient, client_from_config, openweather::OpenWeatherClient};
pub use units::{region_from_locale, suffix_for};
pub use workflow::{Outcome, Phase, Trigger, TriggerResult, WeatherWorkflow, WorkflowSettings};
