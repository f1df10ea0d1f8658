//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod compile;
mod launch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use spool_core::domain::job::Job;
use spool_core::domain::options::LaunchOptions;
use spool_core::dto::job::JobDescription;
use spool_launch::LauncherConfig;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the scheduler spec for a job description
    Compile {
        /// Path to the JSON job description
        job: PathBuf,

        #[command(flatten)]
        launch: LaunchArgs,
    },
    /// Submit a job description to the scheduler
    Launch {
        /// Path to the JSON job description
        job: PathBuf,

        #[command(flatten)]
        launch: LaunchArgs,
    },
}

/// Flags controlling how a job is submitted
#[derive(Args, Debug, Clone)]
pub struct LaunchArgs {
    /// Facility to run the job in
    #[arg(long)]
    facility: Option<String>,

    /// Shot the job belongs to
    #[arg(long)]
    shot: Option<String>,

    /// Submit the job as another user
    #[arg(long)]
    user: Option<String>,

    /// Do not send notification email
    #[arg(long)]
    nomail: bool,

    /// Submit with another uid
    #[arg(long)]
    uid: Option<u32>,

    /// Submit the job paused
    #[arg(long)]
    pause: bool,

    /// Retries per frame before it is marked dead
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Eat frames once they run out of retries
    #[arg(long)]
    autoeat: bool,

    /// OS tag the job requires
    #[arg(long)]
    os: Option<String>,

    /// Submit to this scheduler instead of the configured ones
    #[arg(long)]
    server: Option<String>,

    /// Block until the job is no longer pending
    #[arg(long)]
    wait: bool,

    /// Run the job as a test, failing on the first dead or eaten frame
    #[arg(long)]
    test: bool,

    /// Run the development version of the remote entry point
    #[arg(long)]
    dev: bool,

    /// Run the development version of another user
    #[arg(long)]
    dev_user: Option<String>,
}

impl From<LaunchArgs> for LaunchOptions {
    fn from(args: LaunchArgs) -> Self {
        Self {
            facility: args.facility,
            shot: args.shot,
            user: args.user,
            nomail: args.nomail,
            uid: args.uid,
            pause: args.pause,
            maxretries: args.max_retries,
            autoeat: args.autoeat,
            os: args.os,
            server: args.server,
            wait: args.wait,
            test: args.test,
            dev: args.dev,
            devuser: args.dev_user,
        }
    }
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The launcher configuration
pub async fn handle_command(command: Commands, config: &LauncherConfig) -> Result<()> {
    match command {
        Commands::Compile { job, launch: args } => {
            let job = load_job(&job).await?;
            compile::handle_compile(&job, &args.into(), config)
        }
        Commands::Launch { job, launch: args } => {
            let job = load_job(&job).await?;
            launch::handle_launch(&job, &args.into(), config).await
        }
    }
}

/// Reads and resolves a JSON job description
async fn load_job(path: &Path) -> Result<Job> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read job description {}", path.display()))?;

    let description: JobDescription = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse job description {}", path.display()))?;

    description
        .into_job()
        .with_context(|| format!("Invalid job description {}", path.display()))
}
