use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast::{Receiver, error::RecvError};

use crate::{
    events::{LoadKind, WeatherEvent},
    model::CurrentConditions,
    provider::WeatherApi,
};

#[derive(Debug, Default)]
struct CurrentPanelState {
    conditions: Option<CurrentConditions>,
    error: Option<String>,
    loading: bool,
    refreshing: bool,
    last_location: Option<String>,
}

/// Current-conditions card. Renders the latest snapshot received over the
/// bus and offers a local-only refresh of the last selected location.
#[derive(Debug)]
pub struct CurrentWeatherPanel {
    api: Arc<dyn WeatherApi>,
    state: Mutex<CurrentPanelState>,
}

impl CurrentWeatherPanel {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self {
            api,
            state: Mutex::new(CurrentPanelState::default()),
        }
    }

    pub fn conditions(&self) -> Option<CurrentConditions> {
        self.state.lock().conditions.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        let st = self.state.lock();
        st.loading || st.refreshing
    }

    pub fn last_location(&self) -> Option<String> {
        self.state.lock().last_location.clone()
    }

    /// Apply one broadcast event to the panel's slice of state.
    ///
    /// The selection is recorded as the last known location as soon as it is
    /// announced, whether or not the fetch behind it has completed.
    pub fn handle_event(&self, event: &WeatherEvent) {
        let mut st = self.state.lock();
        match event {
            WeatherEvent::CurrentUpdated { data } => {
                st.conditions = Some(data.clone());
                st.error = None;
            }
            WeatherEvent::Loading {
                kind: LoadKind::Current,
                loading,
            } => st.loading = *loading,
            WeatherEvent::Error {
                kind: LoadKind::Current,
                message,
            } => st.error = Some(message.clone()),
            WeatherEvent::LocationSelected { location } => {
                st.last_location = Some(location.clone());
            }
        }
    }

    /// Repeat the fetch for the last known location, updating local state
    /// only; no events are published. Returns `false` without fetching when
    /// no location is known yet or a fetch is already in flight.
    pub async fn refresh(&self) -> bool {
        let location = {
            let mut st = self.state.lock();
            if st.loading || st.refreshing {
                return false;
            }
            let Some(location) = st.last_location.clone() else {
                return false;
            };
            st.refreshing = true;
            location
        };

        let result = self.api.current_conditions(&location).await;

        let mut st = self.state.lock();
        match result {
            Ok(data) => {
                st.conditions = Some(data);
                st.error = None;
            }
            Err(err) => st.error = Some(err.to_string()),
        }
        st.refreshing = false;
        true
    }

    /// Drive the panel from a bus subscription until the bus is dropped.
    pub async fn run(&self, mut rx: Receiver<WeatherEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.handle_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "current panel lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
