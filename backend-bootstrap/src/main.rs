use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use backend_bootstrap::{init_logging, run_standalone, RunOptions};
use backend_infrastructure::{AppConfig, CONFIG_ENV};

#[derive(Parser, Debug)]
#[command(name = "ticketing-backend")]
#[command(about = "Event query service", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Import `seed_events_path` into MySQL before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var(CONFIG_ENV, config);
    }

    let config = AppConfig::load().await?;
    let _log_guard = init_logging(&config)?;

    let config_path = AppConfig::config_path();
    if Path::new(&config_path).exists() {
        info!("configuration loaded from {}", config_path);
    } else {
        warn!("{} not found, using defaults", config_path);
    }

    run_standalone(config, RunOptions { seed: args.seed }).await
}
