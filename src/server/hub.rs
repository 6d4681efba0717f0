//! Client registry and fan-out

use crate::telemetry::{increment_counter, set_gauge, CounterMetric, GaugeMetric};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Path clients subscribe on
pub const FEED_PATH: &str = "/ws";

/// Fans JSON text out to every connected client
pub struct Hub {
    tx: broadcast::Sender<String>,
    clients: AtomicUsize,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            clients: AtomicUsize::new(0),
        }
    }

    /// Number of clients currently connected
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::SeqCst)
    }

    /// Send `message` to every client; returns how many will receive it
    pub fn broadcast(&self, message: String) -> usize {
        increment_counter(CounterMetric::Broadcasts);
        // Err only means nobody is listening
        self.tx.send(message).unwrap_or(0)
    }

    /// Handshake with `stream` and forward broadcasts until either side closes
    pub async fn serve_client(&self, stream: TcpStream, peer: SocketAddr) {
        let ws = match tokio_tungstenite::accept_hdr_async(stream, check_path).await {
            Ok(ws) => ws,
            Err(e) => {
                tracing::debug!(peer = %peer, error = %e, "WebSocket handshake rejected");
                return;
            }
        };

        let id = Uuid::new_v4();
        let mut rx = self.tx.subscribe();
        let total = self.clients.fetch_add(1, Ordering::SeqCst) + 1;
        set_gauge(GaugeMetric::ConnectedClients, total as f64);
        tracing::info!(client = %id, peer = %peer, total, "Client connected");

        let (mut write, mut read) = ws.split();
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::warn!(client = %id, error = %e, "Failed to send to client");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(client = %id, skipped, "Client lagging, skipped messages");
                    }
                    Err(RecvError::Closed) => break,
                },
                frame = read.next() => match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(client = %id, error = %e, "Client socket error");
                        break;
                    }
                },
            }
        }

        let total = self.clients.fetch_sub(1, Ordering::SeqCst) - 1;
        set_gauge(GaugeMetric::ConnectedClients, total as f64);
        tracing::info!(client = %id, total, "Client disconnected");
    }
}

fn check_path(request: &Request, response: Response) -> Result<Response, ErrorResponse> {
    if request.uri().path() == FEED_PATH {
        return Ok(response);
    }
    let mut error = ErrorResponse::new(Some("Not Found".to_string()));
    *error.status_mut() = StatusCode::NOT_FOUND;
    Err(error)
}
