//! Integration tests for the feed connection manager

use futures_util::{SinkExt, StreamExt};
use nifty_live::feed::{ConnectionEvent, ConnectionManager, ReadyState};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Serves one scripted session per connection, in order; the last session
/// stays open
async fn spawn_feed(sessions: Vec<Vec<&'static str>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let total = sessions.len();
        for (i, frames) in sessions.into_iter().enumerate() {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            for frame in frames {
                ws.send(Message::Text(frame.to_string())).await.unwrap();
            }
            if i + 1 < total {
                ws.send(Message::Close(None)).await.unwrap();
                while let Some(Ok(_)) = ws.next().await {}
            } else {
                tokio::spawn(async move { while let Some(Ok(_)) = ws.next().await {} });
            }
        }
    });

    format!("ws://{}/ws", addr)
}

async fn collect_until_price(
    manager: &ConnectionManager,
    price: f64,
) -> (Vec<ReadyState>, Vec<f64>) {
    let mut conn = manager.connect();
    let mut states = Vec::new();
    let mut prices = Vec::new();

    let run = async {
        while let Some(event) = conn.next_event().await {
            match event {
                ConnectionEvent::StateChanged(s) => states.push(s),
                ConnectionEvent::Message(v) => {
                    let p = v["price"].as_f64().unwrap();
                    prices.push(p);
                    if p == price {
                        break;
                    }
                }
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("feed did not deliver in time");

    (states, prices)
}

#[tokio::test]
async fn test_messages_delivered_in_order() {
    let url = spawn_feed(vec![vec![
        r#"{"symbol":"NIFTY","price":100.0,"server_time":1000.1}"#,
        r#"{"symbol":"NIFTY","price":101.0,"server_time":1000.9}"#,
        r#"{"symbol":"NIFTY","price":102.0,"server_time":1001.4}"#,
    ]])
    .await;
    let manager = ConnectionManager::new(url, Duration::from_millis(50));

    let (states, prices) = collect_until_price(&manager, 102.0).await;

    assert_eq!(states, vec![ReadyState::Connecting, ReadyState::Open]);
    assert_eq!(prices, vec![100.0, 101.0, 102.0]);
}

#[tokio::test]
async fn test_undecodable_frames_skipped() {
    let url = spawn_feed(vec![vec![
        r#"{"price":1.0}"#,
        "not json at all",
        r#"{"price":2.0"#,
        r#"{"price":3.0}"#,
    ]])
    .await;
    let manager = ConnectionManager::new(url, Duration::from_millis(50));

    let (_, prices) = collect_until_price(&manager, 3.0).await;
    assert_eq!(prices, vec![1.0, 3.0]);
}

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let url = spawn_feed(vec![
        vec![r#"{"price":1.0}"#],
        vec![r#"{"price":2.0}"#],
    ])
    .await;
    let manager = ConnectionManager::new(url, Duration::from_millis(50));

    let (states, prices) = collect_until_price(&manager, 2.0).await;

    assert_eq!(prices, vec![1.0, 2.0]);
    let opens = states.iter().filter(|s| **s == ReadyState::Open).count();
    assert_eq!(opens, 2);

    let first_open = states.iter().position(|s| *s == ReadyState::Open).unwrap();
    let last_open = states.iter().rposition(|s| *s == ReadyState::Open).unwrap();
    assert!(states[first_open..last_open].contains(&ReadyState::Closed));
    assert_eq!(states.last(), Some(&ReadyState::Open));
}
