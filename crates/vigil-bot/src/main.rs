//! Vigil trading engine - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Autonomous trading decision engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via VIGIL_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    vigil_telemetry::init_logging()?;

    info!("Starting vigil-bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > VIGIL_CONFIG env var > default.
    let config_path = args
        .config
        .or_else(|| std::env::var("VIGIL_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = vigil_bot::AppConfig::load(&config_path)?;
    info!(
        mode = ?config.engine.mode,
        watchlist = config.engine.watchlist.len(),
        "Configuration loaded"
    );

    let app = vigil_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
