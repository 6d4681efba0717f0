//! Chart viewer
//!
//! Wires the feed connection, the chart owner and the reconciler together.
//! All events are handled one at a time on the caller's task.

mod headless;
mod terminal;

pub use headless::run_headless;
pub use terminal::run_terminal;

use crate::chart::{
    ChartEngine, ChartError, ChartOwner, ReconciledPoint, TickReconciler, Viewport, ViewportSize,
};
use crate::feed::{ConnectionEvent, ReadyState, Tick};
use crate::telemetry::{increment_counter, CounterMetric};
use crate::ui::DisplayState;

/// Viewer state driven by connection and viewport events
pub struct Viewer<E: ChartEngine> {
    owner: ChartOwner<E>,
    viewport: Viewport,
    reconciler: TickReconciler,
    display: DisplayState,
    ready_state: ReadyState,
    dirty: bool,
}

impl<E: ChartEngine> Viewer<E> {
    pub fn new(owner: ChartOwner<E>, viewport: Viewport) -> Self {
        Self {
            owner,
            viewport,
            reconciler: TickReconciler::default(),
            display: DisplayState::default(),
            ready_state: ReadyState::Uninstantiated,
            dirty: true,
        }
    }

    /// Attach the chart surface
    pub fn mount(&mut self) -> Result<(), ChartError> {
        if self.owner.attach(&self.viewport)? {
            self.dirty = true;
        }
        Ok(())
    }

    /// Release the chart surface
    pub fn unmount(&mut self) {
        if self.owner.detach() {
            self.dirty = true;
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn owner(&self) -> &ChartOwner<E> {
        &self.owner
    }

    /// Whether a redraw is due; clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Handle one connection event; returns the plotted point for messages
    pub fn on_connection_event(&mut self, event: ConnectionEvent) -> Option<ReconciledPoint> {
        match event {
            ConnectionEvent::StateChanged(state) => {
                self.ready_state = state;
                self.dirty = true;
                None
            }
            ConnectionEvent::Message(value) => {
                let tick = match Tick::from_value(&value) {
                    Ok(tick) => tick,
                    Err(e) => {
                        increment_counter(CounterMetric::DecodeErrors);
                        tracing::warn!(error = %e, message = %value, "Ignoring message that is not a tick");
                        return None;
                    }
                };

                match self
                    .reconciler
                    .apply(&tick, &mut self.owner, &mut self.display)
                {
                    Ok(Some(point)) => {
                        self.dirty = true;
                        Some(point)
                    }
                    Ok(None) => None,
                    Err(e) => {
                        tracing::error!(error = %e, price = tick.price, "Chart rejected tick");
                        None
                    }
                }
            }
        }
    }

    /// Handle a viewport resize notification
    pub fn on_resize(&mut self, size: ViewportSize) {
        self.viewport.resize(size);
        match self.owner.poll_resize() {
            Ok(_) => self.dirty = true,
            Err(e) => tracing::error!(error = %e, "Chart resize failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartSurface, Container, HeadlessEngine};
    use serde_json::json;

    fn viewer() -> Viewer<HeadlessEngine> {
        let owner = ChartOwner::new(HeadlessEngine::new(100), |s| {
            Container::new(s.width as u32, s.height as u32)
        });
        Viewer::new(owner, Viewport::new(ViewportSize::new(80, 24)))
    }

    fn message(value: serde_json::Value) -> ConnectionEvent {
        ConnectionEvent::Message(value)
    }

    #[test]
    fn test_messages_flow_to_chart_and_display() {
        let mut viewer = viewer();
        viewer.mount().unwrap();

        viewer.on_connection_event(message(json!({"symbol": "NIFTY", "price": 100.0, "server_time": 1000.1})));
        viewer.on_connection_event(message(json!({"symbol": "NIFTY", "price": 101.0, "server_time": 1000.7})));
        let last = viewer
            .on_connection_event(message(json!({"symbol": "NIFTY", "price": 102.0, "server_time": 1001.2})))
            .unwrap();

        assert_eq!(last.point.time, 1001);
        assert_eq!(viewer.display().last_price, Some(102.0));

        let surface = viewer.owner().surface().unwrap();
        let points: Vec<_> = surface.series()[0].data.to_xy();
        assert_eq!(points, vec![(1000.0, 101.0), (1001.0, 102.0)]);
    }

    #[test]
    fn test_malformed_messages_ignored() {
        let mut viewer = viewer();
        viewer.mount().unwrap();

        assert!(viewer.on_connection_event(message(json!(null))).is_none());
        assert!(viewer.on_connection_event(message(json!({"price": "abc"}))).is_none());
        assert!(viewer.on_connection_event(message(json!([1, 2]))).is_none());

        assert_eq!(viewer.display(), &DisplayState::default());
        let stats = viewer.owner().engine().stats();
        assert_eq!(stats.updates(), 0);
    }

    #[test]
    fn test_malformed_messages_counted() {
        let mut viewer = viewer();
        viewer.mount().unwrap();

        let counters = crate::telemetry::capture_counters(|| {
            viewer.on_connection_event(message(json!({"price": null})));
            viewer.on_connection_event(message(json!({"symbol": "NIFTY"})));
            viewer.on_connection_event(message(json!({"price": 5.0, "server_time": 10.0})));
        });

        assert_eq!(counters.get("niftylive_decode_errors_total"), Some(&2));
        assert_eq!(counters.get("niftylive_ticks_applied_total"), Some(&1));
    }

    #[test]
    fn test_state_changes_mark_dirty() {
        let mut viewer = viewer();
        assert!(viewer.take_dirty());
        assert!(!viewer.take_dirty());

        viewer.on_connection_event(ConnectionEvent::StateChanged(ReadyState::Open));
        assert_eq!(viewer.ready_state(), ReadyState::Open);
        assert!(viewer.take_dirty());
    }

    #[test]
    fn test_ticks_before_mount_are_skipped() {
        let mut viewer = viewer();
        assert!(viewer
            .on_connection_event(message(json!({"price": 100.0, "server_time": 1000})))
            .is_none());
        assert_eq!(viewer.display().last_price, None);
    }

    #[test]
    fn test_first_tick_after_remount_is_appended() {
        let mut viewer = viewer();
        viewer.mount().unwrap();
        let first = viewer
            .on_connection_event(message(json!({"price": 1.0, "server_time": 1000.0})))
            .unwrap();
        assert!(!first.amends);

        viewer.unmount();
        viewer.mount().unwrap();
        let second = viewer
            .on_connection_event(message(json!({"price": 2.0, "server_time": 1000.0})))
            .unwrap();

        assert_eq!(second.point.time, 1000);
        assert!(!second.amends);
        let series = &viewer.owner().surface().unwrap().series()[0];
        assert_eq!(series.data.to_xy(), vec![(1000.0, 2.0)]);

        let third = viewer
            .on_connection_event(message(json!({"price": 3.0, "server_time": 1000.5})))
            .unwrap();
        assert!(third.amends);
    }

    #[test]
    fn test_resize_and_remount() {
        let mut viewer = viewer();
        viewer.mount().unwrap();
        viewer.mount().unwrap();
        viewer.on_resize(ViewportSize::new(100, 24));
        assert_eq!(viewer.owner().surface().unwrap().options().width, 100);

        viewer.unmount();
        viewer.mount().unwrap();
        let stats = viewer.owner().engine().stats();
        assert_eq!(stats.surfaces_created(), 2);
        assert_eq!(stats.live_surfaces(), 1);
        assert_eq!(stats.live_series(), 1);
    }
}
