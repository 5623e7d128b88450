//! Display panels: stateless-by-protocol consumers that rebuild their view
//! purely from broadcast event payloads. No panel queries another component
//! for state.

pub mod current;
pub mod forecast;

pub use current::CurrentWeatherPanel;
pub use forecast::ForecastPanel;
