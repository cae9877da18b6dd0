use anyhow::Result;

use super::classify::cmd_classify;
use super::commands::Commands;
use super::config::cmd_config;
use super::env::CliArgs;
use super::plan::cmd_plan;
use super::truncate::cmd_truncate;
use soulform::LoadedConfig;

pub async fn dispatch(cli: &CliArgs, loaded: &LoadedConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::Truncate(args) => cmd_truncate(args, &loaded.config).await,
        Commands::Classify(args) => cmd_classify(args),
        Commands::Plan(args) => cmd_plan(args).await,
        Commands::Config => cmd_config(loaded),
    }
}
