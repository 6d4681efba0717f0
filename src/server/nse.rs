//! NSE option-chain client
//!
//! NSE only answers API calls carrying the cookies set by its homepage, so
//! the client keeps a cookie session and refreshes it periodically or when
//! the API rejects a request.

use super::{PriceSource, Quote};
use crate::config::ServerConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

#[derive(Debug, Deserialize)]
struct OptionChainResponse {
    #[serde(default)]
    records: Records,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Records {
    #[serde(default)]
    underlying_value: Option<f64>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Cookie-session client for the NSE option-chain API
pub struct NseClient {
    client: Client,
    base_url: String,
    symbol: String,
    cookie_expiry: Duration,
    last_refresh: Mutex<Option<Instant>>,
}

impl NseClient {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            symbol: config.symbol.clone(),
            cookie_expiry: config.cookie_expiry(),
            last_refresh: Mutex::new(None),
        })
    }

    /// Visit the homepage to renew the session cookies
    pub async fn refresh_cookies(&self) -> anyhow::Result<()> {
        tracing::info!(url = %self.base_url, "Refreshing NSE cookies");
        let response = self.client.get(&self.base_url).send().await;

        // Stamp the attempt either way so a dead homepage is not hit on every poll
        if let Ok(mut last) = self.last_refresh.lock() {
            *last = Some(Instant::now());
        }

        let response = response?;
        tracing::info!(status = %response.status(), "NSE homepage responded");
        Ok(())
    }

    fn cookies_stale(&self) -> bool {
        match self.last_refresh.lock() {
            Ok(last) => last.map_or(true, |at| at.elapsed() > self.cookie_expiry),
            Err(_) => true,
        }
    }

    async fn refresh_logged(&self) {
        if let Err(e) = self.refresh_cookies().await {
            tracing::error!(error = %e, "Failed to refresh NSE cookies");
        }
    }

    async fn get_chain(&self) -> reqwest::Result<Response> {
        let url = format!("{}/api/option-chain-indices", self.base_url);
        self.client
            .get(&url)
            .query(&[("symbol", self.symbol.as_str())])
            .send()
            .await
    }
}

#[async_trait]
impl PriceSource for NseClient {
    async fn fetch_quote(&self) -> anyhow::Result<Option<Quote>> {
        if self.cookies_stale() {
            self.refresh_logged().await;
        }

        let mut response = self.get_chain().await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::warn!(
                status = %response.status(),
                "NSE rejected request, refreshing cookies and retrying"
            );
            self.refresh_logged().await;
            response = self.get_chain().await?;
        }

        if response.status() != StatusCode::OK {
            tracing::error!(status = %response.status(), "Failed to fetch option chain");
            return Ok(None);
        }

        let body: OptionChainResponse = response.json().await?;
        Ok(Some(Quote {
            symbol: self.symbol.clone(),
            price: body.records.underlying_value,
            timestamp: body.records.timestamp,
        }))
    }
}
