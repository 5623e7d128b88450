//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider adapter normalizing external weather/geocoding JSON
//! - The typed broadcast bus coupling search to the display panels
//! - The search controller and the two display panels
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or
//! services hosting the same dashboard core.

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod panel;
pub mod persistence;
pub mod provider;
pub mod search;

pub use config::Config;
pub use error::WeatherError;
pub use events::{EventBus, LoadKind, WeatherEvent};
pub use model::{CurrentConditions, Forecast, ForecastPoint, LocationCandidate};
pub use panel::{CurrentWeatherPanel, ForecastPanel};
pub use persistence::PersistenceClient;
pub use provider::{WeatherApi, openweather::OpenWeatherClient};
pub use search::SearchController;
