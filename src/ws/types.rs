//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// Delay between reconnection attempts used when none is configured
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(3);

/// WebSocket client configuration
///
/// Reconnection is unconditional: every failure or close is retried after
/// `reconnect_interval`, forever, with no backoff.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Fixed delay before every reconnection attempt
    pub reconnect_interval: Duration,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
    /// Buffer size of the event channel handed to the consumer
    pub channel_capacity: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            ping_interval: Duration::from_secs(30),
            channel_capacity: 1024,
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the reconnection delay
    pub fn reconnect_interval(mut self, d: Duration) -> Self {
        self.reconnect_interval = d;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Set the consumer channel capacity
    pub fn channel_capacity(mut self, n: usize) -> Self {
        self.channel_capacity = n.max(1);
        self
    }
}

/// WebSocket events delivered to the consumer, in transport order
#[derive(Debug, Clone, PartialEq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
    /// A connection attempt is starting
    Connecting,
    /// Connection established
    Connected,
    /// Server sent a close frame
    Closing,
    /// Connection closed or failed
    Disconnected,
    /// Waiting `reconnect_interval` before the next attempt
    Reconnecting { attempt: u32 },
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WsError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// Consumer dropped its receiver
    #[error("Channel closed")]
    ChannelClosed,
}
