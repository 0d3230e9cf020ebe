mod cli;
mod commands;
mod input;

use anyhow::Result;
use clap::Parser;

use adpulse_core::config::{load_dotenv, Config};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config = Config::from_env();
    if let Some(dir) = &args.rules_dir {
        config.analytics.rules_dir = dir.clone();
    }
    config.log_summary();

    commands::run(args, &config).await
}
