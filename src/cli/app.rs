use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use super::dispatch::dispatch;
use super::env::CliArgs;
use soulform::{init_logging, load_config};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    // Logging comes after the config so the configured level applies.
    let loaded = load_config(cli.config.as_deref()).await?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded.config.log_level.clone());
    init_logging(&level, cli.debug)?;

    info!("Starting soulform v{}", env!("CARGO_PKG_VERSION"));
    if loaded.found {
        info!("Loaded configuration from: {}", loaded.path.display());
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            loaded.path.display()
        );
    }

    match dispatch(&cli, &loaded).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}
