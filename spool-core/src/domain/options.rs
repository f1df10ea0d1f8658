//! Launch options

use serde::{Deserialize, Serialize};

/// Caller-supplied options for a single launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchOptions {
    pub facility: Option<String>,
    pub shot: Option<String>,
    /// Overrides the ambient user as the job owner
    pub user: Option<String>,
    /// Suppresses the notification email
    pub nomail: bool,
    /// Overrides the ambient uid
    pub uid: Option<u32>,
    /// Submit the job paused
    pub pause: bool,
    pub maxretries: u32,
    pub autoeat: bool,
    /// OS tag; falls back to the environment override when unset
    pub os: Option<String>,
    /// Scheduler host to use instead of the configured ones
    pub server: Option<String>,
    /// Block until the job leaves the pending state
    pub wait: bool,
    /// Supervise the job and fail on the first dead or eaten frame
    pub test: bool,
    pub dev: bool,
    pub devuser: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            facility: None,
            shot: None,
            user: None,
            nomail: false,
            uid: None,
            pause: false,
            maxretries: 3,
            autoeat: false,
            os: None,
            server: None,
            wait: false,
            test: false,
            dev: false,
            devuser: None,
        }
    }
}

/// What happens after the job is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Return as soon as the scheduler accepts the job
    Detached,
    /// Block until the job is no longer pending
    Wait,
    /// Unpause, supervise to completion and always kill the job afterwards
    Test,
}

impl LaunchOptions {
    /// Post-submission mode; `wait` takes precedence over `test`
    pub fn mode(&self) -> LaunchMode {
        if self.wait {
            LaunchMode::Wait
        } else if self.test {
            LaunchMode::Test
        } else {
            LaunchMode::Detached
        }
    }
}
