//! Search controller: owns the query text, live suggestion lookups, and the
//! commit-a-search action that drives the rest of the dashboard over the bus.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::{
    events::{EventBus, LoadKind, WeatherEvent},
    model::LocationCandidate,
    provider::WeatherApi,
};

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    suggestions: Vec<LocationCandidate>,
    error: Option<String>,
    loading: bool,
    last_lookup_at: Option<Instant>,
}

/// Drives searches against the provider adapter and publishes the outcome as
/// broadcast events. Suggestion state (list, error, loading flag) is local to
/// the controller; only committed searches and selections reach the bus.
#[derive(Debug)]
pub struct SearchController {
    api: Arc<dyn WeatherApi>,
    bus: EventBus,
    /// Minimum gap between suggestion lookups. Zero disables rate limiting
    /// and every keystroke issues a fresh lookup.
    min_lookup_interval: Duration,
    /// Monotonic lookup counter; completions carrying a superseded number
    /// are discarded so out-of-order responses cannot clobber newer ones.
    lookup_seq: AtomicU64,
    state: Mutex<SearchState>,
}

impl SearchController {
    pub fn new(api: Arc<dyn WeatherApi>, bus: EventBus) -> Self {
        Self {
            api,
            bus,
            min_lookup_interval: Duration::ZERO,
            lookup_seq: AtomicU64::new(0),
            state: Mutex::new(SearchState::default()),
        }
    }

    /// Throttle live suggestion lookups to at most one per `interval`.
    pub fn with_min_lookup_interval(mut self, interval: Duration) -> Self {
        self.min_lookup_interval = interval;
        self
    }

    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Replace the query text without triggering a suggestion lookup.
    pub fn set_query(&self, text: &str) {
        self.state.lock().query = text.to_string();
    }

    pub fn suggestions(&self) -> Vec<LocationCandidate> {
        self.state.lock().suggestions.clone()
    }

    pub fn suggestion_error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_looking_up(&self) -> bool {
        self.state.lock().loading
    }

    /// Commit the current query. Blank and whitespace-only queries are a
    /// silent no-op. Otherwise the fetch is wrapped in the three-phase
    /// broadcast: loading-start, then the outcome, then loading-end.
    /// The end signal fires on failure too.
    pub async fn commit_search(&self) {
        let query = self.query();
        if query.trim().is_empty() {
            return;
        }

        self.bus.publish(WeatherEvent::Loading {
            kind: LoadKind::Current,
            loading: true,
        });

        match self.api.current_conditions(&query).await {
            Ok(data) => {
                self.bus.publish(WeatherEvent::CurrentUpdated { data });
                self.bus.publish(WeatherEvent::LocationSelected {
                    location: query,
                });
            }
            Err(err) => {
                self.bus.publish(WeatherEvent::Error {
                    kind: LoadKind::Current,
                    message: err.to_string(),
                });
            }
        }

        self.bus.publish(WeatherEvent::Loading {
            kind: LoadKind::Current,
            loading: false,
        });
    }

    /// React to an input-field change. A blank query clears the suggestion
    /// list synchronously with no network call; anything else triggers a
    /// geocoding lookup (subject to the rate-limit policy). On failure the
    /// prior list is left untouched and the error string is set instead.
    pub async fn update_query(&self, text: &str) {
        {
            let mut st = self.state.lock();
            st.query = text.to_string();

            if text.trim().is_empty() {
                st.suggestions.clear();
                return;
            }

            if self.min_lookup_interval > Duration::ZERO
                && let Some(at) = st.last_lookup_at
                && at.elapsed() < self.min_lookup_interval
            {
                return;
            }

            st.last_lookup_at = Some(Instant::now());
            st.loading = true;
            st.error = None;
        }

        let seq = self.lookup_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.api.search_locations(text).await;

        let mut st = self.state.lock();
        if self.lookup_seq.load(Ordering::SeqCst) != seq {
            // A later keystroke's lookup owns the state now.
            return;
        }

        match result {
            Ok(list) => st.suggestions = list,
            Err(err) => st.error = Some(err.to_string()),
        }
        st.loading = false;
    }

    /// Disambiguate the query into the picked candidate: the query text
    /// becomes the "Name, Country" label, suggestions are cleared, and the
    /// fetch goes by exact coordinates with the same three-phase broadcast
    /// as a committed search.
    pub async fn select_candidate(&self, candidate: &LocationCandidate) {
        let label = candidate.display_label();

        {
            let mut st = self.state.lock();
            st.query = label.clone();
            st.suggestions.clear();
        }

        self.bus.publish(WeatherEvent::Loading {
            kind: LoadKind::Current,
            loading: true,
        });

        match self
            .api
            .current_at(candidate.latitude, candidate.longitude)
            .await
        {
            Ok(data) => {
                self.bus.publish(WeatherEvent::CurrentUpdated { data });
                self.bus.publish(WeatherEvent::LocationSelected { location: label });
            }
            Err(err) => {
                self.bus.publish(WeatherEvent::Error {
                    kind: LoadKind::Current,
                    message: err.to_string(),
                });
            }
        }

        self.bus.publish(WeatherEvent::Loading {
            kind: LoadKind::Current,
            loading: false,
        });
    }
}
