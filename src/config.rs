//! Configuration types for nifty-live

use crate::feed::Endpoint;
use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Tick feed (viewer side) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Host (and port) serving the feed
    #[serde(default = "default_host")]
    pub host: String,
    /// Use `wss://` instead of `ws://`
    #[serde(default)]
    pub secure: bool,
    /// Path of the feed endpoint
    #[serde(default = "default_path")]
    pub path: String,
    /// Full URL, overrides host/secure/path when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fixed delay between reconnection attempts (milliseconds)
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Buffer between the socket task and the UI loop
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_host() -> String {
    "localhost:8000".to_string()
}
fn default_path() -> String {
    "/ws".to_string()
}
fn default_reconnect_interval_ms() -> u64 {
    3000
}
fn default_channel_capacity() -> usize {
    1024
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            secure: false,
            path: default_path(),
            url: None,
            reconnect_interval_ms: default_reconnect_interval_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl FeedConfig {
    /// Endpoint described by host/secure/path
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.secure, &self.host, &self.path)
    }

    /// URL the viewer connects to
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => self.endpoint().url(),
        }
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

/// Chart surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Points kept in the series before the oldest are evicted
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    /// Fixed surface height; the container height when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Container size used by the headless viewer
    #[serde(default = "default_headless_width")]
    pub headless_width: u16,
    #[serde(default = "default_headless_height")]
    pub headless_height: u16,
}

fn default_max_points() -> usize {
    5000
}
fn default_headless_width() -> u16 {
    800
}
fn default_headless_height() -> u16 {
    500
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_points: default_max_points(),
            height: None,
            headless_width: default_headless_width(),
            headless_height: default_headless_height(),
        }
    }
}

/// Backend (`serve`) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Index symbol to poll
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Upstream base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Session cookies are refreshed when older than this
    #[serde(default = "default_cookie_expiry_secs")]
    pub cookie_expiry_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Broadcast buffer; slower clients skip what they missed
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_symbol() -> String {
    "NIFTY".to_string()
}
fn default_base_url() -> String {
    "https://www.nseindia.com".to_string()
}
fn default_poll_interval_secs() -> u64 {
    2
}
fn default_cookie_expiry_secs() -> u64 {
    300
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_broadcast_capacity() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            symbol: default_symbol(),
            base_url: default_base_url(),
            poll_interval_secs: default_poll_interval_secs(),
            cookie_expiry_secs: default_cookie_expiry_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl ServerConfig {
    /// Poll interval, at least one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn cookie_expiry(&self) -> Duration {
        Duration::from_secs(self.cookie_expiry_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Append logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Serve Prometheus metrics on this port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log file used by the terminal viewer when none is configured
pub fn default_log_file() -> PathBuf {
    PathBuf::from("nifty-live.log")
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            log_file: None,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [feed]
            host = "charts.example.com"
            secure = true
            reconnect_interval_ms = 1500

            [chart]
            max_points = 100
            height = 40

            [server]
            bind = "127.0.0.1:9000"
            poll_interval_secs = 5

            [telemetry]
            log_level = "debug"
            log_format = "json"
            metrics_port = 9090
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.url(), "wss://charts.example.com/ws");
        assert_eq!(config.feed.reconnect_interval(), Duration::from_millis(1500));
        assert_eq!(config.chart.max_points, 100);
        assert_eq!(config.chart.height, Some(40));
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.server.symbol, "NIFTY");
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.feed.url(), "ws://localhost:8000/ws");
        assert_eq!(config.feed.reconnect_interval(), Duration::from_secs(3));
        assert_eq!(config.chart.max_points, 5000);
        assert!(config.chart.height.is_none());
        assert_eq!(config.server.cookie_expiry(), Duration::from_secs(300));
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.log_file.is_none());
    }

    #[test]
    fn test_url_override() {
        let config: Config = toml::from_str(
            r#"
            [feed]
            host = "ignored:1"
            url = "ws://10.0.0.2:8000/feed"
        "#,
        )
        .unwrap();
        assert_eq!(config.feed.url(), "ws://10.0.0.2:8000/feed");
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config: Config = toml::from_str("[server]\npoll_interval_secs = 0").unwrap();
        assert_eq!(config.server.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_log_format() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [telemetry]
            log_format = "xml"
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nsymbol = \"BANKNIFTY\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.symbol, "BANKNIFTY");
    }

    #[test]
    fn test_config_serializes_back() {
        let mut config = Config::default();
        config.chart.height = Some(30);
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("metrics_port"));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.chart.height, Some(30));
        assert_eq!(parsed.feed.url(), config.feed.url());
        assert_eq!(parsed.telemetry.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }
}
