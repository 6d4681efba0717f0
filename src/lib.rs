//! nifty-live: Live NIFTY 50 price chart over a WebSocket tick stream
//!
//! This library provides the core components for:
//! - A reconnecting WebSocket client and feed connection manager
//! - Tick reconciliation onto a strictly increasing time axis
//! - Chart surface lifecycle with headless and terminal engines
//! - Terminal presentation of price, status and chart
//! - A polling backend that broadcasts NSE quotes to viewers
//! - Structured logging and Prometheus metrics

pub mod chart;
pub mod cli;
pub mod config;
pub mod feed;
pub mod server;
pub mod telemetry;
pub mod ui;
pub mod viewer;
pub mod ws;
