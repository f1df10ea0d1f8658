//! Launcher configuration
//!
//! Site-wide settings: where the wrapper and entry point binaries live on the
//! workers, the notification email domain, version tags stamped into every
//! command, the spec DTD and the scheduler connection.

use std::time::Duration;

/// Launcher configuration
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Directory holding the frame wrapper binaries on the workers
    pub wrapper_dir: String,

    /// Working directory token passed to the wrapper
    pub user_dir: String,

    /// Directory holding the remote entry point
    pub bin_dir: String,

    /// Domain appended to the user name for notification email
    pub email_domain: String,

    /// Version tag passed to the remote entry point
    pub version: String,

    /// Source repository tag passed to the remote entry point
    pub repos: String,

    /// Scheduler base URLs, tried in order
    pub scheduler_hosts: Vec<String>,

    /// Interval between polls in wait and test modes
    pub poll_interval: Duration,

    /// Public identifier of the spec DTD
    pub dtd_public_id: String,

    /// Location of the spec DTD
    pub dtd_url: String,
}

impl LauncherConfig {
    /// Creates a configuration with defaults
    pub fn new() -> Self {
        Self {
            wrapper_dir: "/usr/local/spool/wrappers".to_string(),
            user_dir: "/tmp".to_string(),
            bin_dir: "/usr/local/spool/bin".to_string(),
            email_domain: "localhost".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            repos: "default".to_string(),
            scheduler_hosts: vec!["http://localhost:8080".to_string()],
            poll_interval: Duration::from_secs(5),
            dtd_public_id: "SPI Cue  Specification Language".to_string(),
            dtd_url: "http://localhost:8080/spcue/dtd/cjsl-1.8.dtd".to_string(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional and falls back to the default:
    /// - SPOOL_WRAPPER_DIR
    /// - SPOOL_USER_DIR
    /// - SPOOL_BIN_DIR
    /// - SPOOL_EMAIL_DOMAIN
    /// - SPOOL_VERSION
    /// - SPOOL_REPOS
    /// - SPOOL_SCHEDULER_HOSTS (comma-separated)
    /// - SPOOL_POLL_INTERVAL (seconds)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Some(dir) = env_var("SPOOL_WRAPPER_DIR") {
            config.wrapper_dir = dir;
        }
        if let Some(dir) = env_var("SPOOL_USER_DIR") {
            config.user_dir = dir;
        }
        if let Some(dir) = env_var("SPOOL_BIN_DIR") {
            config.bin_dir = dir;
        }
        if let Some(domain) = env_var("SPOOL_EMAIL_DOMAIN") {
            config.email_domain = domain;
        }
        if let Some(version) = env_var("SPOOL_VERSION") {
            config.version = version;
        }
        if let Some(repos) = env_var("SPOOL_REPOS") {
            config.repos = repos;
        }
        if let Some(hosts) = env_var("SPOOL_SCHEDULER_HOSTS") {
            config.scheduler_hosts = parse_hosts(&hosts);
        }
        if let Some(interval) = env_var("SPOOL_POLL_INTERVAL") {
            let secs = interval.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("SPOOL_POLL_INTERVAL must be a number of seconds, got '{}'", interval)
            })?;
            config.poll_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replaces the scheduler hosts
    pub fn with_scheduler_hosts(mut self, hosts: Vec<String>) -> Self {
        self.scheduler_hosts = hosts;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.wrapper_dir.is_empty() {
            anyhow::bail!("wrapper_dir cannot be empty");
        }

        if self.bin_dir.is_empty() {
            anyhow::bail!("bin_dir cannot be empty");
        }

        if self.scheduler_hosts.is_empty() {
            anyhow::bail!("at least one scheduler host is required");
        }

        for host in &self.scheduler_hosts {
            if !host.starts_with("http://") && !host.starts_with("https://") {
                anyhow::bail!("scheduler host '{}' must start with http:// or https://", host);
            }
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a comma-separated host list
pub fn parse_hosts(hosts: &str) -> Vec<String> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
