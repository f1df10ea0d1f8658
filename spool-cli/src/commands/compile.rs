//! Compile command handler
//!
//! Prints the spec a launch would submit, without contacting the scheduler.

use anyhow::{Context, Result};
use spool_client::SchedulerClient;
use spool_core::domain::context::EnvContext;
use spool_core::domain::job::Job;
use spool_core::domain::options::LaunchOptions;
use spool_launch::{Launcher, LauncherConfig};

/// Compile `job` and print the document on stdout
pub fn handle_compile(job: &Job, options: &LaunchOptions, config: &LauncherConfig) -> Result<()> {
    let client = SchedulerClient::new(config.scheduler_hosts.clone());
    let launcher = Launcher::new(client, config.clone(), EnvContext::from_process());

    let spec = launcher
        .serialize(options, job)
        .with_context(|| format!("Failed to compile job {}", job.name))?;

    println!("{}", spec);

    Ok(())
}
