//! WebSocket client library
//!
//! Provides a reusable WebSocket client with unconditional fixed-interval
//! reconnection and ping keepalive.

mod client;
mod types;

pub use client::{WsClient, WsSubscription};
pub use types::{WsConfig, WsError, WsMessage, DEFAULT_RECONNECT_INTERVAL};
