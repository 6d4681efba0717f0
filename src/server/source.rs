//! Upstream price sources

use async_trait::async_trait;

/// A quote read from upstream, before the backend stamps it
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    /// Missing when upstream returned a record without a value
    pub price: Option<f64>,
    pub timestamp: Option<String>,
}

/// Trait for upstream quote sources
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the latest quote; `Ok(None)` when upstream had nothing usable
    async fn fetch_quote(&self) -> anyhow::Result<Option<Quote>>;
}
