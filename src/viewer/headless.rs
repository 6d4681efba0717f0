//! Headless viewer: one JSON line per plotted point on stdout

use super::Viewer;
use crate::chart::{ChartOwner, Container, HeadlessEngine, TimeBasis, Viewport, ViewportSize};
use crate::config::Config;
use crate::feed::ConnectionManager;
use crate::ws::WsConfig;
use std::future::Future;
use std::io::Write;

fn full_viewport(size: ViewportSize) -> Container {
    Container::new(size.width as u32, size.height as u32)
}

/// Run without a terminal UI until Ctrl-C
pub async fn run_headless(config: &Config, url: String) -> anyhow::Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Interrupted, shutting down viewer");
    };
    run_until(config, url, &mut std::io::stdout(), shutdown).await
}

/// Plot ticks and write a line per point to `out` until `shutdown` resolves
async fn run_until<W: Write>(
    config: &Config,
    url: String,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let viewport = Viewport::new(ViewportSize::new(
        config.chart.headless_width,
        config.chart.headless_height,
    ));
    let owner = ChartOwner::new(HeadlessEngine::new(config.chart.max_points), full_viewport)
        .with_fixed_height(config.chart.height);
    let mut viewer = Viewer::new(owner, viewport);
    viewer.mount()?;

    let manager = ConnectionManager::with_config(
        WsConfig::new(url)
            .reconnect_interval(config.feed.reconnect_interval())
            .channel_capacity(config.feed.channel_capacity),
    );
    let mut connection = manager.connect();

    // One shutdown future for the whole run so a signal between events is kept
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = connection.next_event() => {
                let Some(event) = event else { break };
                if let Some(p) = viewer.on_connection_event(event) {
                    let line = serde_json::json!({
                        "time": p.point.time,
                        "value": p.point.value,
                        "amended": p.amends,
                        "basis": match p.basis {
                            TimeBasis::Server => "server",
                            TimeBasis::WallClock => "wall_clock",
                        },
                        "state": viewer.ready_state().label(),
                    });
                    writeln!(out, "{}", line)?;
                    out.flush()?;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    viewer.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::Message;

    #[tokio::test]
    async fn test_writes_points_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let (sent_tx, sent_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            for frame in [
                r#"{"price":100.0,"server_time":1000.2}"#,
                r#"{"price":101.0,"server_time":1000.8}"#,
            ] {
                ws.send(Message::Text(frame.to_string())).await.unwrap();
            }
            let _ = sent_tx.send(());
            while let Some(Ok(_)) = ws.next().await {}
        });

        // Stop a little after the server has written both frames
        let shutdown = async {
            let _ = sent_rx.await;
            tokio::time::sleep(Duration::from_millis(300)).await;
        };

        let mut out = Vec::new();
        tokio::time::timeout(
            Duration::from_secs(10),
            run_until(&Config::default(), url, &mut out, shutdown),
        )
        .await
        .expect("shutdown future was not honoured")
        .unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["amended"], false);
        assert_eq!(lines[1]["amended"], true);
        assert_eq!(lines[1]["value"], 101.0);
        assert_eq!(lines[1]["basis"], "server");
        assert_eq!(lines[1]["state"], "Open");
    }

    #[tokio::test]
    async fn test_shutdown_while_disconnected() {
        let mut out = Vec::new();
        let shutdown = tokio::time::sleep(Duration::from_millis(50));

        run_until(&Config::default(), "ws://127.0.0.1:1/ws".into(), &mut out, shutdown)
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
