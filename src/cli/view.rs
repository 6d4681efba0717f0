//! View command implementation

use crate::config::Config;
use crate::feed::Endpoint;
use clap::Args;

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Feed URL, e.g. ws://localhost:8000/ws
    #[arg(long, conflicts_with = "origin")]
    pub url: Option<String>,

    /// Page origin to derive the feed URL from, e.g. https://host
    #[arg(long)]
    pub origin: Option<String>,

    /// Print plotted points as JSON lines instead of drawing
    #[arg(long)]
    pub headless: bool,
}

impl ViewArgs {
    /// Feed URL from the flags, falling back to the config
    pub fn feed_url(&self, config: &Config) -> anyhow::Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        if let Some(origin) = &self.origin {
            let endpoint = Endpoint::from_origin(origin)?;
            return Ok(endpoint.url());
        }
        Ok(config.feed.url())
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let url = self.feed_url(config)?;
        if self.headless {
            tracing::info!(url = %url, "Starting headless viewer");
            crate::viewer::run_headless(config, url).await
        } else {
            tracing::info!(url = %url, "Starting terminal viewer");
            crate::viewer::run_terminal(config, url).await
        }
    }
}
