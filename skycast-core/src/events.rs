//! Typed broadcast events coupling the search controller to the display
//! panels.
//!
//! A closed enum carried over a `tokio::sync::broadcast` channel:
//! fire-and-forget, multi-subscriber, no payload retained by the bus itself.
//! The wire names and payload shapes the host UI listens for are fixed;
//! [`WeatherEvent::name`] and the serde output reproduce them exactly.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::model::CurrentConditions;

const CHANNEL_CAPACITY: usize = 16;

/// Category tag carried by loading and error events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    Current,
}

/// One broadcast message.
///
/// Untagged serialization yields exactly the payload shapes the host UI
/// expects, e.g. `{"type":"current","loading":true}`; the event name string
/// comes from [`WeatherEvent::name`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherEvent {
    Loading {
        #[serde(rename = "type")]
        kind: LoadKind,
        loading: bool,
    },
    CurrentUpdated {
        data: CurrentConditions,
    },
    LocationSelected {
        location: String,
    },
    Error {
        #[serde(rename = "type")]
        kind: LoadKind,
        message: String,
    },
}

impl WeatherEvent {
    /// Wire name of this event. Exact strings matter for interop.
    pub fn name(&self) -> &'static str {
        match self {
            WeatherEvent::Loading { .. } => "weather:loading",
            WeatherEvent::CurrentUpdated { .. } => "weather:current-updated",
            WeatherEvent::LocationSelected { .. } => "weather:location-selected",
            WeatherEvent::Error { .. } => "weather:error",
        }
    }
}

/// In-process broadcast bus.
///
/// Cloning is cheap; every clone publishes into the same channel. Dispatch
/// is fire-and-forget: publishing with no live subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WeatherEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: WeatherEvent) {
        tracing::debug!(event = event.name(), "publish");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WeatherEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_wire_strings() {
        let loading = WeatherEvent::Loading {
            kind: LoadKind::Current,
            loading: true,
        };
        let selected = WeatherEvent::LocationSelected {
            location: "Paris".into(),
        };
        let error = WeatherEvent::Error {
            kind: LoadKind::Current,
            message: "nope".into(),
        };

        let updated = WeatherEvent::CurrentUpdated {
            data: crate::model::CurrentConditions {
                temperature_c: 22,
                condition: "Rain".into(),
                humidity_pct: 71,
                wind_speed: 4.1,
                visibility_km: 9,
                icon: "10d".into(),
                display_location: "London, GB".into(),
            },
        };

        assert_eq!(loading.name(), "weather:loading");
        assert_eq!(updated.name(), "weather:current-updated");
        assert_eq!(selected.name(), "weather:location-selected");
        assert_eq!(error.name(), "weather:error");
    }

    #[test]
    fn loading_payload_shape() {
        let event = WeatherEvent::Loading {
            kind: LoadKind::Current,
            loading: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"type": "current", "loading": true}));
    }

    #[test]
    fn error_payload_shape() {
        let event = WeatherEvent::Error {
            kind: LoadKind::Current,
            message: "failed to fetch current weather".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "current",
                "message": "failed to fetch current weather"
            })
        );
    }

    #[test]
    fn selection_payload_shape() {
        let event = WeatherEvent::LocationSelected {
            location: "London, GB".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"location": "London, GB"}));
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::new();
        bus.publish(WeatherEvent::LocationSelected {
            location: "Oslo, NO".into(),
        });
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_event() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(WeatherEvent::LocationSelected {
            location: "Kyiv, UA".into(),
        });

        let got_a = a.recv().await.unwrap();
        let got_b = b.recv().await.unwrap();
        assert_eq!(got_a, got_b);
        assert_eq!(got_a.name(), "weather:location-selected");
    }
}
