//! Integration tests for the price backend

use async_trait::async_trait;
use futures_util::StreamExt;
use nifty_live::feed::Tick;
use nifty_live::server::{self, Hub, PriceSource, Quote};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

pub struct FixedSource(pub f64);

#[async_trait]
impl PriceSource for FixedSource {
    async fn fetch_quote(&self) -> anyhow::Result<Option<Quote>> {
        Ok(Some(Quote {
            symbol: "NIFTY".into(),
            price: Some(self.0),
            timestamp: Some("14-Oct-2026 10:15:02".into()),
        }))
    }
}

pub async fn spawn_backend() -> (SocketAddr, Arc<Hub>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hub = Arc::new(Hub::new(16));
    tokio::spawn(server::serve(listener, Arc::clone(&hub)));
    (addr, hub)
}

pub async fn wait_for_clients(hub: &Hub, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while hub.client_count() != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client count not reached");
}

#[tokio::test]
async fn test_handshake_rejects_other_paths() {
    let (addr, hub) = spawn_backend().await;

    let result = tokio_tungstenite::connect_async(format!("ws://{}/other", addr)).await;
    let err = result.err().expect("handshake should fail");
    assert!(err.to_string().contains("404"), "unexpected error: {}", err);
    assert_eq!(hub.client_count(), 0);
}

#[tokio::test]
async fn test_broadcast_reaches_every_client() {
    let (addr, hub) = spawn_backend().await;
    let url = format!("ws://{}/ws", addr);

    let (mut first, _) = tokio_tungstenite::connect_async(url.clone()).await.unwrap();
    let (mut second, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    wait_for_clients(&hub, 2).await;

    let sent = server::poll_once(&FixedSource(24850.75), &hub)
        .await
        .unwrap()
        .unwrap();

    for client in [&mut first, &mut second] {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let Message::Text(text) = frame else {
            panic!("expected text frame, got {:?}", frame);
        };
        let tick: Tick = serde_json::from_str(&text).unwrap();
        assert_eq!(tick, sent);
        assert_eq!(tick.price, 24850.75);
        assert!(tick.server_time.is_some());
    }

    drop(second);
    wait_for_clients(&hub, 1).await;
}
