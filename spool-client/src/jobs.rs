//! Job-related scheduler endpoints

use serde::Deserialize;

use crate::SchedulerClient;
use crate::error::{ClientError, Result};
use spool_core::domain::handle::JobHandle;

/// Response of the pending-job query
#[derive(Debug, Deserialize)]
struct PendingResponse {
    pending: bool,
}

impl SchedulerClient {
    // =============================================================================
    // Submission
    // =============================================================================

    /// Submit a compiled job spec and wait for the scheduler to create it
    ///
    /// # Arguments
    /// * `spec` - The serialized XML job spec
    ///
    /// # Returns
    /// Handles for every job the spec created
    pub async fn launch_spec_and_wait(&self, spec: &str) -> Result<Vec<JobHandle>> {
        let response = self
            .execute(|client, host| {
                client
                    .post(format!("{}/api/spec/launch", host))
                    .header(reqwest::header::CONTENT_TYPE, "application/xml")
                    .body(spec.to_string())
            })
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Job Status
    // =============================================================================

    /// Fetch a fresh snapshot of a job
    ///
    /// # Arguments
    /// * `job` - The job to refresh
    pub async fn get_job(&self, job: &JobHandle) -> Result<JobHandle> {
        let response = self
            .execute(|client, host| client.get(format!("{}/api/jobs/{}", host, job.id)))
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("job {}", job.name)));
        }

        self.handle_response(response).await
    }

    /// Check whether a job with the given name is still pending
    ///
    /// # Arguments
    /// * `name` - The job name
    pub async fn is_job_pending(&self, name: &str) -> Result<bool> {
        let response = self
            .execute(|client, host| {
                client
                    .get(format!("{}/api/jobs/pending", host))
                    .query(&[("name", name)])
            })
            .await?;

        let pending: PendingResponse = self.handle_response(response).await?;
        Ok(pending.pending)
    }

    // =============================================================================
    // Job Control
    // =============================================================================

    /// Unpause a job
    pub async fn resume_job(&self, job: &JobHandle) -> Result<()> {
        let response = self
            .execute(|client, host| client.post(format!("{}/api/jobs/{}/resume", host, job.id)))
            .await?;

        self.handle_empty_response(response).await
    }

    /// Kill a job and all of its frames
    pub async fn kill_job(&self, job: &JobHandle) -> Result<()> {
        let response = self
            .execute(|client, host| client.post(format!("{}/api/jobs/{}/kill", host, job.id)))
            .await?;

        self.handle_empty_response(response).await
    }
}
