use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use soulform::observe::HtmlTruncator;
use soulform::SoulformConfig;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

#[derive(Args, Clone, Debug)]
pub struct TruncateArgs {
    /// Maximum length in characters (defaults to fill.snapshot_max_len)
    #[arg(short, long)]
    pub max: Option<usize>,

    /// HTML file to read; stdin when omitted
    pub file: Option<PathBuf>,
}

pub async fn cmd_truncate(args: TruncateArgs, config: &SoulformConfig) -> Result<()> {
    let html = match &args.file {
        Some(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let truncator = HtmlTruncator::new(args.max.unwrap_or(config.fill.snapshot_max_len));
    let html = html.trim_end_matches(['\r', '\n']);
    let output = truncator.truncate(html);
    debug!(
        input = html.chars().count(),
        output = output.chars().count(),
        max = truncator.max_len(),
        "truncated"
    );
    println!("{output}");
    Ok(())
}
