use clap::Parser;
use nifty_live::cli::{Cli, Commands};
use nifty_live::config::Config;
use nifty_live::telemetry::LogTarget;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // The terminal viewer owns the screen, so its logs go to a file
    let target = match &cli.command {
        Commands::View(args) if !args.headless => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    nifty_live::telemetry::init_telemetry(&config.telemetry, target)?;

    match cli.command {
        Commands::View(args) => {
            args.execute(&config).await?;
        }
        Commands::Serve(args) => {
            tracing::info!("Starting price backend");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("# Current configuration");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
