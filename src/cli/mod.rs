//! CLI interface for nifty-live
//!
//! Provides subcommands for:
//! - `view`: Live chart of the tick feed
//! - `serve`: Poll NSE and broadcast ticks over WebSocket
//! - `config`: Show the effective configuration

mod serve;
mod view;

pub use serve::ServeArgs;
pub use view::ViewArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nifty-live")]
#[command(about = "Live NIFTY 50 price chart over a WebSocket tick stream")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the live chart
    View(ViewArgs),
    /// Run the price backend
    Serve(ServeArgs),
    /// Show configuration
    Config,
}
