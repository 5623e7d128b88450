//! Error types shared across the dashboard core.

use thiserror::Error;

/// Failures surfaced by the provider adapter.
///
/// The `Display` text is deliberately stable: provider failures render a fixed
/// per-operation message so the UI error channel stays predictable, while the
/// underlying cause goes to the logs only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeatherError {
    /// A required configuration value is absent. Raised before any network
    /// call is attempted, with the same message on every call.
    #[error("missing required configuration: {0}")]
    Configuration(&'static str),

    /// Non-2xx response or transport failure. The HTTP status (when the
    /// request got that far) rides along for diagnostics but is not part of
    /// the user-visible message.
    #[error("{message}")]
    Provider {
        message: &'static str,
        status: Option<u16>,
    },
}

impl WeatherError {
    pub fn provider(message: &'static str, status: Option<u16>) -> Self {
        Self::Provider { message, status }
    }
}
