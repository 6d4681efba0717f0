//! Price backend
//!
//! Polls the upstream quote source on a fixed interval and broadcasts each
//! quote, stamped with `server_time`, to every client on `/ws`.

mod hub;
mod nse;
mod source;

pub use hub::{Hub, FEED_PATH};
pub use nse::NseClient;
pub use source::{PriceSource, Quote};

use crate::config::ServerConfig;
use crate::feed::Tick;
use crate::telemetry::{increment_counter, CounterMetric};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Run the backend until the listener fails
pub async fn run(config: &ServerConfig) -> anyhow::Result<()> {
    let source = NseClient::new(config)?;
    if let Err(e) = source.refresh_cookies().await {
        tracing::error!(error = %e, "Failed to refresh cookies on startup");
    }

    let hub = Arc::new(Hub::new(config.broadcast_capacity));
    let listener = TcpListener::bind(&config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        symbol = %config.symbol,
        poll_secs = config.poll_interval_secs,
        "Backend listening"
    );

    let poller = tokio::spawn(poll_loop(source, Arc::clone(&hub), config.poll_interval()));
    serve_while_polling(listener, hub, poller).await
}

/// Serve clients until the listener fails or the poller stops
async fn serve_while_polling(
    listener: TcpListener,
    hub: Arc<Hub>,
    mut poller: JoinHandle<()>,
) -> anyhow::Result<()> {
    tokio::select! {
        result = serve(listener, hub) => {
            poller.abort();
            result
        }
        joined = &mut poller => match joined {
            Ok(()) => Err(anyhow::anyhow!("Poll loop stopped")),
            Err(e) => Err(anyhow::anyhow!("Poll loop failed: {}", e)),
        },
    }
}

/// Accept connections and hand each to the hub
pub async fn serve(listener: TcpListener, hub: Arc<Hub>) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            hub.serve_client(stream, peer).await;
        });
    }
}

/// Poll `source` forever, one quote per `interval`
pub async fn poll_loop<S: PriceSource>(source: S, hub: Arc<Hub>, interval: Duration) {
    let interval = if interval.is_zero() {
        tracing::warn!("Zero poll interval, using {:?}", MIN_POLL_INTERVAL);
        MIN_POLL_INTERVAL
    } else {
        interval
    };
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(e) = poll_once(&source, &hub).await {
            increment_counter(CounterMetric::UpstreamErrors);
            tracing::error!(error = %e, "Error in broadcast loop");
        }
    }
}

/// Fetch one quote and broadcast it; returns the tick that was sent
pub async fn poll_once<S: PriceSource + ?Sized>(
    source: &S,
    hub: &Hub,
) -> anyhow::Result<Option<Tick>> {
    let Some(quote) = source.fetch_quote().await? else {
        tracing::warn!("No data received from upstream");
        return Ok(None);
    };
    let Some(price) = quote.price else {
        tracing::warn!(symbol = %quote.symbol, "Quote without a price, not broadcasting");
        return Ok(None);
    };

    let tick = Tick {
        symbol: quote.symbol,
        price,
        timestamp: quote.timestamp,
        server_time: Some(unix_seconds_now()),
    };
    let receivers = hub.broadcast(serde_json::to_string(&tick)?);
    tracing::debug!(price, receivers, "Broadcast quote");
    Ok(Some(tick))
}

fn unix_seconds_now() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1e6
}
