//! Tick feed types

use serde::{Deserialize, Serialize};

/// One price update from the feed
///
/// Only `price` is required. A missing, zero or non-finite `server_time`
/// makes the chart fall back to wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Index symbol (e.g., "NIFTY")
    #[serde(default)]
    pub symbol: String,
    /// Last traded / underlying value
    pub price: f64,
    /// Upstream timestamp string, as given by the exchange
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Backend wall-clock at broadcast, fractional unix seconds
    #[serde(default)]
    pub server_time: Option<f64>,
}

impl Tick {
    /// Decode a tick from an already-parsed JSON message
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Tick::deserialize(value)
    }

    /// Whole seconds of `server_time`, if it is usable as a time basis
    pub fn server_seconds(&self) -> Option<i64> {
        match self.server_time {
            Some(t) if t.is_finite() && t != 0.0 => Some(t.floor() as i64),
            _ => None,
        }
    }
}

/// Connection lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadyState {
    /// No connection attempt made yet
    #[default]
    Uninstantiated,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ReadyState {
    /// Human-readable status label
    pub fn label(self) -> &'static str {
        match self {
            ReadyState::Uninstantiated => "Uninstantiated",
            ReadyState::Connecting => "Connecting",
            ReadyState::Open => "Open",
            ReadyState::Closing => "Closing",
            ReadyState::Closed => "Closed",
        }
    }

    pub fn is_open(self) -> bool {
        self == ReadyState::Open
    }
}

impl std::fmt::Display for ReadyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
