//! Scheduler abstraction
//!
//! The operations the launcher needs from a remote scheduler. The HTTP
//! client implements it; tests substitute an in-memory scheduler.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::SchedulerClient;
use crate::error::Result;
use spool_core::domain::handle::JobHandle;

/// A remote scheduling service
///
/// Configuration methods are called once before the first request; after
/// that the scheduler is only used for requests and polling.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Points the client at the given hosts exclusively
    fn set_hosts(&mut self, hosts: Vec<String>);

    /// Sets the request timeout; `None` disables it
    fn set_timeout(&mut self, timeout: Option<Duration>);

    /// Submits a spec and returns the jobs it created
    async fn launch_spec_and_wait(&self, spec: &str) -> Result<Vec<JobHandle>>;

    /// Fetches a refreshed snapshot of a job
    async fn get_job(&self, job: &JobHandle) -> Result<JobHandle>;

    /// Whether the named job is still pending
    async fn is_job_pending(&self, name: &str) -> Result<bool>;

    /// Unpauses a job
    async fn resume(&self, job: &JobHandle) -> Result<()>;

    /// Kills a job
    async fn kill(&self, job: &JobHandle) -> Result<()>;
}

#[async_trait]
impl Scheduler for SchedulerClient {
    fn set_hosts(&mut self, hosts: Vec<String>) {
        self.hosts = crate::normalize_hosts(hosts);
        debug!("Scheduler hosts set to: {}", self.hosts.join(", "));
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    async fn launch_spec_and_wait(&self, spec: &str) -> Result<Vec<JobHandle>> {
        SchedulerClient::launch_spec_and_wait(self, spec).await
    }

    async fn get_job(&self, job: &JobHandle) -> Result<JobHandle> {
        SchedulerClient::get_job(self, job).await
    }

    async fn is_job_pending(&self, name: &str) -> Result<bool> {
        SchedulerClient::is_job_pending(self, name).await
    }

    async fn resume(&self, job: &JobHandle) -> Result<()> {
        self.resume_job(job).await
    }

    async fn kill(&self, job: &JobHandle) -> Result<()> {
        self.kill_job(job).await
    }
}
