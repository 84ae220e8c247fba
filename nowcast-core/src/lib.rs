//! Core library for the `nowcast` weather app.
//!
//! This crate defines:
//! - Shared domain models (coordinates, weather snapshots)
//! - The mapping from weather conditions to display choices
//! - The location permission gate and location services
//! - Abstraction over weather sources
//! - Screen state and view models
//! - Configuration & credentials handling
//!
//! It is used by `nowcast-cli`, but stays independent of any rendering layer.

pub mod config;
pub mod location;
pub mod model;
pub mod presentation;
pub mod screen;
pub mod source;

pub use config::{Config, SourceConfig};
pub use location::{
    FixedLocation, IpLocation, LocationGate, LocationService, PermissionError, PermissionState,
};
pub use model::{ConditionEntry, Coordinates, Readings, WeatherRequest, WeatherSnapshot};
pub use presentation::{IconId, PresentationDescriptor, ThemeId};
pub use screen::{Action, AppState, Effect, Screen, reducer};
pub use source::{SourceId, WeatherSource};
