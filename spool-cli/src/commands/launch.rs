//! Launch command handler

use anyhow::{Context, Result};
use colored::*;
use spool_client::{JobHandle, JobState, SchedulerClient};
use spool_core::domain::context::EnvContext;
use spool_core::domain::job::Job;
use spool_core::domain::options::{LaunchMode, LaunchOptions};
use spool_launch::{Launcher, LauncherConfig};

/// Submit `job` and print a summary of the resulting scheduler job
pub async fn handle_launch(job: &Job, options: &LaunchOptions, config: &LauncherConfig) -> Result<()> {
    let client = SchedulerClient::new(config.scheduler_hosts.clone());
    let mut launcher = Launcher::new(client, config.clone(), EnvContext::from_process());

    let handle = launcher
        .launch(options, job)
        .await
        .with_context(|| format!("Failed to launch job {}", job.name))?;

    match options.mode() {
        LaunchMode::Detached => println!("{}", "✓ Job launched".green()),
        LaunchMode::Wait => println!("{}", "✓ Job completed".green()),
        LaunchMode::Test => println!("{}", "✓ Job test passed".green()),
    }
    print_job_summary(&handle);

    Ok(())
}

/// Print a job summary
fn print_job_summary(job: &JobHandle) {
    println!("  {} Job {}", "▸".cyan(), job.name.bold());
    println!("    ID:       {}", job.id.to_string().dimmed());
    println!("    State:    {}", colorize_state(job.state));
    println!(
        "    Frames:   {}/{} succeeded",
        job.stats.succeeded_frames, job.stats.total_frames
    );
    if job.stats.failed_frames() > 0 {
        println!(
            "    Failed:   {}",
            format!(
                "{} dead, {} eaten",
                job.stats.dead_frames, job.stats.eaten_frames
            )
            .red()
        );
    }
    if let Some(started) = job.start_time {
        println!(
            "    Started:  {}",
            started.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}

/// Colorize job state for display
fn colorize_state(state: JobState) -> colored::ColoredString {
    let state_str = format!("{:?}", state);
    match state {
        JobState::Pending | JobState::Posted => state_str.yellow(),
        JobState::Startup => state_str.cyan(),
        JobState::Finished => state_str.green(),
        JobState::Shutdown => state_str.red(),
    }
}
