//! Launch errors

use spool_client::ClientError;
use spool_core::FrameRangeError;
use thiserror::Error;

/// Result type alias for launch operations
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Errors raised while compiling, submitting or supervising a job
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No layer survived the inclusion rules
    #[error(
        "failed to launch job '{job}': no registered root layer has frames inside the job range ({range})"
    )]
    NoLaunchableWork { job: String, range: String },

    /// A frame-precise dependency target has no frame to depend on
    #[error("job '{job}': cannot resolve dependency of layer '{layer}' on '{target}': {reason}")]
    DependencyResolution {
        job: String,
        layer: String,
        target: String,
        reason: String,
    },

    /// A layer or job frame range could not be parsed
    #[error("job '{job}': invalid frame range on layer '{layer}': {source}")]
    InvalidFrameRange {
        job: String,
        layer: String,
        #[source]
        source: FrameRangeError,
    },

    /// Writing the spec document failed
    #[error("failed to serialize job spec: {0}")]
    Serialize(String),

    /// The scheduler rejected the spec
    #[error("failed to submit job '{job}': {source}")]
    Submission {
        job: String,
        #[source]
        source: ClientError,
    },

    /// The scheduler accepted the spec but reported no job
    #[error("scheduler returned no job for submission of '{job}'")]
    EmptySubmission { job: String },

    /// Test mode observed dead or eaten frames
    #[error("Job test failed, dead or eaten frames on: {job} ({dead} dead, {eaten} eaten)")]
    JobFailed { job: String, dead: u32, eaten: u32 },

    /// Test mode lost contact with the scheduler
    #[error("test for job {job} failed: {source}")]
    Supervision {
        job: String,
        #[source]
        source: ClientError,
    },

    /// The job could not be killed after a successful test run
    #[error("failed to kill job {job} after test: {source}")]
    Cleanup {
        job: String,
        #[source]
        source: ClientError,
    },
}

impl LaunchError {
    /// Whether the error was raised before anything reached the scheduler
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoLaunchableWork { .. }
                | Self::DependencyResolution { .. }
                | Self::InvalidFrameRange { .. }
                | Self::Serialize(_)
        )
    }
}
