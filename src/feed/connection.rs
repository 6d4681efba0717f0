//! Connection manager for the tick feed socket

use super::ReadyState;
use crate::telemetry::{increment_counter, CounterMetric};
use crate::ws::{WsClient, WsConfig, WsMessage, WsSubscription};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;

/// Event surfaced to the UI loop
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// A decoded JSON message, delivered once in arrival order
    Message(Value),
    /// The ready state changed
    StateChanged(ReadyState),
}

/// Opens and maintains the feed socket
pub struct ConnectionManager {
    config: WsConfig,
}

impl ConnectionManager {
    /// Create a manager for `url`, retrying every `reconnect_interval`
    pub fn new(url: impl Into<String>, reconnect_interval: Duration) -> Self {
        Self {
            config: WsConfig::new(url).reconnect_interval(reconnect_interval),
        }
    }

    pub fn with_config(config: WsConfig) -> Self {
        Self { config }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Start connecting. The returned [`Connection`] owns the socket task.
    pub fn connect(&self) -> Connection {
        tracing::info!(
            url = %self.config.url,
            reconnect_ms = self.config.reconnect_interval.as_millis() as u64,
            "Opening feed connection"
        );
        let (state_tx, _) = watch::channel(ReadyState::Uninstantiated);
        Connection {
            subscription: WsClient::new(self.config.clone()).connect(),
            ready_state: ReadyState::Uninstantiated,
            state_tx,
            last_message: None,
        }
    }
}

/// A live feed connection
pub struct Connection {
    subscription: WsSubscription,
    ready_state: ReadyState,
    state_tx: watch::Sender<ReadyState>,
    last_message: Option<Value>,
}

impl Connection {
    /// Current ready state
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Observe ready-state changes without consuming events
    pub fn watch_state(&self) -> watch::Receiver<ReadyState> {
        self.state_tx.subscribe()
    }

    /// Most recently decoded message
    pub fn last_message(&self) -> Option<&Value> {
        self.last_message.as_ref()
    }

    /// Wait for the next message or state change
    ///
    /// Frames that are not valid JSON are logged, counted and skipped.
    /// Returns `None` once the socket task has stopped.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        loop {
            let Some(msg) = self.subscription.recv().await else {
                return self.transition(ReadyState::Closed);
            };

            let event = match msg {
                WsMessage::Text(text) => self.decode(text.as_bytes()),
                WsMessage::Binary(data) => self.decode(&data),
                WsMessage::Connecting => self.transition(ReadyState::Connecting),
                WsMessage::Connected => self.transition(ReadyState::Open),
                WsMessage::Closing => self.transition(ReadyState::Closing),
                WsMessage::Disconnected => self.transition(ReadyState::Closed),
                WsMessage::Reconnecting { attempt } => {
                    tracing::debug!(attempt, "Feed waiting to reconnect");
                    None
                }
            };

            if event.is_some() {
                return event;
            }
        }
    }

    fn decode(&mut self, raw: &[u8]) -> Option<ConnectionEvent> {
        match serde_json::from_slice::<Value>(raw) {
            Ok(value) => {
                self.last_message = Some(value.clone());
                Some(ConnectionEvent::Message(value))
            }
            Err(e) => {
                increment_counter(CounterMetric::DecodeErrors);
                tracing::warn!(error = %e, bytes = raw.len(), "Dropping undecodable frame");
                None
            }
        }
    }

    fn transition(&mut self, next: ReadyState) -> Option<ConnectionEvent> {
        if self.ready_state == next {
            return None;
        }
        tracing::info!(from = %self.ready_state, to = %next, "Feed ready state changed");
        self.ready_state = next;
        self.state_tx.send_replace(next);
        Some(ConnectionEvent::StateChanged(next))
    }
}
