//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{increment_counter, set_gauge, CounterMetric, GaugeMetric};

#[cfg(test)]
pub(crate) use self::metrics::capture_counters;

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, unless a log file is configured
    Stderr,
    /// Always a file; the terminal viewer owns stdout
    File,
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig, target: LogTarget) -> anyhow::Result<()> {
    let file = match (target, &config.log_file) {
        (_, Some(path)) => Some(path.clone()),
        (LogTarget::File, None) => Some(crate::config::default_log_file()),
        (LogTarget::Stderr, None) => None,
    };
    init_logging(&config.log_level, config.log_format, file.as_deref())?;

    if let Some(port) = config.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| anyhow::anyhow!("Failed to install prometheus exporter: {}", e))?;
        tracing::info!(metrics_addr = %addr, "Prometheus metrics exporter enabled");
    }

    Ok(())
}
