use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::{Receiver, error::RecvError};

use crate::{
    events::WeatherEvent,
    model::Forecast,
    provider::WeatherApi,
};

#[derive(Debug, Default)]
struct ForecastPanelState {
    forecast: Option<Forecast>,
    error: Option<String>,
    loading: bool,
}

/// 5-day forecast chart. Reacts only to location selections; every selection
/// triggers an independent forecast fetch.
///
/// There is no cancellation: a superseded fetch still runs to completion.
/// With `discard_stale` on (the default) its late result is dropped via a
/// generation counter; with it off, whichever response lands last owns the
/// displayed state.
#[derive(Debug)]
pub struct ForecastPanel {
    api: Arc<dyn WeatherApi>,
    discard_stale: bool,
    generation: AtomicU64,
    state: Mutex<ForecastPanelState>,
}

impl ForecastPanel {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self::with_stale_policy(api, true)
    }

    pub fn with_stale_policy(api: Arc<dyn WeatherApi>, discard_stale: bool) -> Self {
        Self {
            api,
            discard_stale,
            generation: AtomicU64::new(0),
            state: Mutex::new(ForecastPanelState::default()),
        }
    }

    pub fn forecast(&self) -> Option<Forecast> {
        self.state.lock().forecast.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub async fn handle_event(&self, event: &WeatherEvent) {
        if let WeatherEvent::LocationSelected { location } = event {
            self.load(location).await;
        }
    }

    /// Fetch and apply the forecast for one location.
    pub async fn load(&self, location: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut st = self.state.lock();
            st.loading = true;
            st.error = None;
        }

        let result = self.api.forecast(location).await;

        let mut st = self.state.lock();
        if self.discard_stale && self.generation.load(Ordering::SeqCst) != generation {
            // A newer selection superseded this response; its fetch owns the
            // state now.
            return;
        }

        match result {
            Ok(forecast) => {
                st.forecast = Some(forecast);
                st.error = None;
            }
            Err(err) => st.error = Some(err.to_string()),
        }
        st.loading = false;
    }

    /// Drive the panel from a bus subscription until the bus is dropped.
    pub async fn run(&self, mut rx: Receiver<WeatherEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.handle_event(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "forecast panel lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
