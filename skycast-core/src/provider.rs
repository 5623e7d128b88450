use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{CurrentConditions, Forecast, LocationCandidate},
};

pub mod openweather;

/// Stable user-facing message for a failed current-weather fetch.
pub const CURRENT_FETCH_ERROR: &str = "failed to fetch current weather";
/// Stable user-facing message for a failed forecast fetch.
pub const FORECAST_FETCH_ERROR: &str = "failed to fetch forecast";
/// Stable user-facing message for a failed geocoding lookup.
pub const SEARCH_FETCH_ERROR: &str = "failed to search locations";

/// Adapter over the external weather/geocoding provider.
///
/// Every operation re-checks credentials before any network I/O and never
/// retries; failures surface as [`WeatherError`] with a fixed per-operation
/// message.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Current weather for a free-text city name.
    async fn current_conditions(&self, query: &str) -> Result<CurrentConditions, WeatherError>;

    /// Current weather for exact coordinates, used after a suggestion is
    /// picked so the lookup cannot be ambiguous.
    async fn current_at(&self, lat: f64, lon: f64) -> Result<CurrentConditions, WeatherError>;

    /// 5-day forecast: at most 5 noon samples, one per day, chronological.
    async fn forecast(&self, query: &str) -> Result<Forecast, WeatherError>;

    /// Geocoding lookup, capped at 5 candidates in provider relevance order.
    async fn search_locations(&self, query: &str)
    -> Result<Vec<LocationCandidate>, WeatherError>;
}
