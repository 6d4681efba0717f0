//! WebSocket client with automatic reconnection

use super::types::{WsConfig, WsError, WsMessage};
use crate::telemetry::{increment_counter, CounterMetric};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Reusable WebSocket client with fixed-interval reconnection and ping keepalive
pub struct WsClient {
    config: WsConfig,
}

/// Live stream of events from a [`WsClient`]
///
/// Owns the background connection task. Dropping the subscription aborts
/// the task, including any pending reconnect delay.
pub struct WsSubscription {
    rx: mpsc::Receiver<WsMessage>,
    task: JoinHandle<()>,
}

impl WsSubscription {
    /// Receive the next event; `None` once the connection task has stopped
    pub async fn recv(&mut self) -> Option<WsMessage> {
        self.rx.recv().await
    }
}

impl Drop for WsSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and return a subscription for events
    ///
    /// This spawns a background task that handles connection management,
    /// reconnection after the configured fixed delay, and ping keepalive.
    /// Lifecycle events (Connecting, Connected, Closing, Disconnected,
    /// Reconnecting) are interleaved with data frames in arrival order.
    pub fn connect(&self) -> WsSubscription {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            Self::run_connection_loop(config, tx).await;
        });

        WsSubscription { rx, task }
    }

    /// Run the connection loop; only stops when the consumer goes away
    async fn run_connection_loop(config: WsConfig, tx: mpsc::Sender<WsMessage>) {
        let mut reconnect_attempts = 0;

        loop {
            if tx.send(WsMessage::Connecting).await.is_err() {
                break;
            }

            match Self::connect_and_stream(&config, &tx).await {
                Ok(()) => {
                    tracing::info!(url = %config.url, "WebSocket connection closed");
                }
                Err(WsError::ChannelClosed) => {
                    tracing::debug!("Receiver dropped, stopping connection loop");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, url = %config.url, "WebSocket connection error");
                }
            }

            if tx.send(WsMessage::Disconnected).await.is_err() {
                break;
            }

            reconnect_attempts += 1;
            increment_counter(CounterMetric::Reconnects);
            tracing::info!(
                attempt = reconnect_attempts,
                delay_ms = config.reconnect_interval.as_millis() as u64,
                "Reconnecting..."
            );

            if tx
                .send(WsMessage::Reconnecting {
                    attempt: reconnect_attempts,
                })
                .await
                .is_err()
            {
                break;
            }

            sleep(config.reconnect_interval).await;
        }
    }

    /// Connect to WebSocket and stream messages until the connection ends
    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
    ) -> Result<(), WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(config.url.as_str())
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        tracing::info!("WebSocket connected");

        tx.send(WsMessage::Connected)
            .await
            .map_err(|_| WsError::ChannelClosed)?;

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ping_interval.tick().await;

        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            tx.send(WsMessage::Text(text)).await
                                .map_err(|_| WsError::ChannelClosed)?;
                        }
                        Some(Ok(Message::Binary(data))) => {
                            tx.send(WsMessage::Binary(data)).await
                                .map_err(|_| WsError::ChannelClosed)?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            tx.send(WsMessage::Closing).await
                                .map_err(|_| WsError::ChannelClosed)?;
                            return Ok(());
                        }
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                        // Pings are answered by tungstenite itself.
                        Some(Ok(_)) => {}
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }

                _ = tx.closed() => {
                    return Err(WsError::ChannelClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ws_client_creation() {
        let client = WsClient::with_url("wss://example.com/ws");
        assert_eq!(client.url(), "wss://example.com/ws");
    }

    #[test]
    fn test_ws_client_with_config() {
        let config = WsConfig::new("ws://test.com/ws")
            .reconnect_interval(Duration::from_secs(5))
            .ping_interval(Duration::from_secs(15));

        let client = WsClient::new(config);
        assert_eq!(client.url(), "ws://test.com/ws");
        assert_eq!(client.config.reconnect_interval, Duration::from_secs(5));
        assert_eq!(client.config.ping_interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_retrying() {
        // Nothing listens on port 1, connects are refused immediately
        let client = WsClient::new(
            WsConfig::new("ws://127.0.0.1:1/ws").reconnect_interval(Duration::from_millis(10)),
        );

        let mut sub = client.connect();
        let mut events = Vec::new();

        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(msg) = sub.recv().await {
                events.push(msg);
                if events.len() == 7 {
                    break;
                }
            }
        })
        .await
        .expect("Test timed out");

        assert_eq!(
            events,
            vec![
                WsMessage::Connecting,
                WsMessage::Disconnected,
                WsMessage::Reconnecting { attempt: 1 },
                WsMessage::Connecting,
                WsMessage::Disconnected,
                WsMessage::Reconnecting { attempt: 2 },
                WsMessage::Connecting,
            ]
        );
    }

    #[tokio::test]
    async fn test_drop_subscription_stops_task() {
        let client = WsClient::new(
            WsConfig::new("ws://127.0.0.1:1/ws").reconnect_interval(Duration::from_secs(60)),
        );
        let sub = client.connect();
        let handle = sub.task.abort_handle();
        drop(sub);

        tokio::time::timeout(Duration::from_secs(1), async {
            while !handle.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("task should be aborted");
    }
}
