//! Serve command implementation

use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address, overrides `server.bind`
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut server = config.server.clone();
        if let Some(bind) = &self.bind {
            server.bind = bind.clone();
        }

        tokio::select! {
            result = crate::server::run(&server) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down backend");
                Ok(())
            }
        }
    }
}
