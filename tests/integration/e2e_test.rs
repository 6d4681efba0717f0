//! End-to-end integration tests

use crate::server_test::{spawn_backend, wait_for_clients, FixedSource};
use nifty_live::chart::{ChartOwner, Container, HeadlessEngine, Viewport, ViewportSize};
use nifty_live::config::Config;
use nifty_live::feed::{ConnectionEvent, ConnectionManager, ReadyState};
use nifty_live::server;
use nifty_live::viewer::Viewer;
use std::time::Duration;

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.feed.url(), "ws://localhost:8000/ws");
    assert_eq!(config.feed.reconnect_interval(), Duration::from_secs(3));
    assert_eq!(config.chart.max_points, 5000);
    assert_eq!(config.server.symbol, "NIFTY");
    assert_eq!(config.server.poll_interval(), Duration::from_secs(2));
    assert!(config.telemetry.metrics_port.is_none());
}

#[tokio::test]
async fn test_backend_to_chart() {
    let (addr, hub) = spawn_backend().await;

    let owner = ChartOwner::new(HeadlessEngine::new(100), |s: ViewportSize| {
        Container::new(u32::from(s.width), u32::from(s.height))
    });
    let mut viewer = Viewer::new(owner, Viewport::new(ViewportSize::new(800, 500)));
    viewer.mount().unwrap();

    let manager = ConnectionManager::new(format!("ws://{}/ws", addr), Duration::from_millis(50));
    let mut connection = manager.connect();

    let run = async {
        // Wait for the socket to open before anything is broadcast
        while viewer.ready_state() != ReadyState::Open {
            let event = connection.next_event().await.unwrap();
            viewer.on_connection_event(event);
        }
        wait_for_clients(&hub, 1).await;

        let mut plotted = Vec::new();
        for price in [24800.0, 24801.5] {
            server::poll_once(&FixedSource(price), &hub).await.unwrap();
            loop {
                let event = connection.next_event().await.unwrap();
                let is_message = matches!(event, ConnectionEvent::Message(_));
                if let Some(point) = viewer.on_connection_event(event) {
                    plotted.push(point);
                }
                if is_message {
                    break;
                }
            }
        }
        plotted
    };
    let plotted = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("ticks did not arrive in time");

    assert_eq!(plotted.len(), 2);
    assert!(plotted[0].point.time <= plotted[1].point.time);
    assert_eq!(viewer.display().last_price, Some(24801.5));

    let surface = viewer.owner().surface().unwrap();
    let last = surface.series()[0].data.last().unwrap();
    assert_eq!(last.value, 24801.5);
}
