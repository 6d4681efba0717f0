//! Prometheus metrics

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Ticks written to the chart (new or amended)
    TicksApplied,
    /// Ticks merged into the existing last point
    PointsAmended,
    /// Ticks whose time coordinate was clamped forward
    TimeClamped,
    /// Ticks plotted on wall-clock time because `server_time` was missing
    TimeFallback,
    /// Frames that did not decode into a tick
    DecodeErrors,
    /// Reconnection attempts by the WebSocket client
    Reconnects,
    /// Quotes broadcast by the backend
    Broadcasts,
    /// Upstream quote fetch failures
    UpstreamErrors,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Last plotted price
    LastPrice,
    /// Clients connected to the backend
    ConnectedClients,
}

impl CounterMetric {
    /// Exported metric name
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::TicksApplied => "niftylive_ticks_applied_total",
            CounterMetric::PointsAmended => "niftylive_points_amended_total",
            CounterMetric::TimeClamped => "niftylive_time_clamped_total",
            CounterMetric::TimeFallback => "niftylive_time_fallback_total",
            CounterMetric::DecodeErrors => "niftylive_decode_errors_total",
            CounterMetric::Reconnects => "niftylive_reconnects_total",
            CounterMetric::Broadcasts => "niftylive_broadcasts_total",
            CounterMetric::UpstreamErrors => "niftylive_upstream_errors_total",
        }
    }
}

impl GaugeMetric {
    /// Exported metric name
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::LastPrice => "niftylive_last_price",
            GaugeMetric::ConnectedClients => "niftylive_connected_clients",
        }
    }
}

/// Increment a counter by one
pub fn increment_counter(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Run `f` against a local recorder and return the counters it bumped
#[cfg(test)]
pub(crate) fn capture_counters(f: impl FnOnce()) -> std::collections::HashMap<String, u64> {
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    metrics::with_local_recorder(&recorder, f);

    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(key, _, _, value)| match value {
            DebugValue::Counter(n) => Some((key.key().name().to_string(), n)),
            _ => None,
        })
        .collect()
}
