use serde::{Deserialize, Serialize};

/// Icon token used when the provider payload carries no icon.
pub const DEFAULT_ICON: &str = "01d";

/// Snapshot of current weather at one location.
///
/// Produced by one successful fetch, replaced wholesale by the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Rounded, degrees Celsius.
    pub temperature_c: i32,
    /// Short label, e.g. "Clouds". "Unknown" when the provider omits it.
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    /// Derived from raw meters / 1000, rounded. 0 when missing.
    pub visibility_km: u32,
    /// Provider icon vocabulary token, e.g. "04d".
    pub icon: String,
    /// Human-readable "City, Country".
    pub display_location: String,
}

/// One day of the 5-day forecast, taken from the noon sample of that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Calendar date, "YYYY-MM-DD".
    pub date: String,
    pub temp_min_c: i32,
    pub temp_max_c: i32,
    pub condition: String,
    pub icon: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
}

/// Up to 5 noon samples in chronological order, one per day.
pub type Forecast = Vec<ForecastPoint>;

/// Geocoding result a user can disambiguate a free-text query into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationCandidate {
    /// Display label used for the query field and selection broadcasts.
    pub fn display_label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}
