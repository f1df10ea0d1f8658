//! Remote job handles
//!
//! Snapshots of a submitted job as reported by the scheduler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted job as last seen on the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: Uuid,
    pub name: String,
    pub state: JobState,
    #[serde(default)]
    pub stats: JobStats,
    #[serde(default)]
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Scheduler-side job state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Finished,
    Startup,
    Shutdown,
    Posted,
}

/// Frame counters of a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobStats {
    pub dead_frames: u32,
    pub eaten_frames: u32,
    pub succeeded_frames: u32,
    pub running_frames: u32,
    pub waiting_frames: u32,
    pub total_frames: u32,
}

impl JobStats {
    /// Frames that will not complete without intervention
    pub fn failed_frames(&self) -> u32 {
        self.dead_frames.saturating_add(self.eaten_frames)
    }
}
