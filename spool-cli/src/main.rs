//! Spool CLI
//!
//! Compiles job descriptions into scheduler specs and launches them.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use spool_launch::LauncherConfig;
use spool_launch::config::parse_hosts;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "spool=info,spool_launch=info,spool_client=info";
const VERBOSE_FILTER: &str = "spool=debug,spool_launch=debug,spool_client=debug";

#[derive(Parser)]
#[command(name = "spool")]
#[command(about = "Render farm job launcher", long_about = None)]
struct Cli {
    /// Comma-separated scheduler URLs, tried in order
    #[arg(long, env = "SPOOL_SCHEDULER_HOSTS")]
    scheduler_hosts: Option<String>,

    /// Log polling and submission details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = LauncherConfig::from_env().context("Failed to load configuration")?;
    if let Some(hosts) = cli.scheduler_hosts.as_deref() {
        config = config.with_scheduler_hosts(parse_hosts(hosts));
    }
    config.validate().context("Invalid configuration")?;

    handle_command(cli.command, &config).await
}
