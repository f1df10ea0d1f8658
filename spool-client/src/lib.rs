//! Spool Scheduler Client
//!
//! HTTP client for the remote render-farm scheduler. The launcher only needs
//! a handful of operations (submit a spec, refresh a job, query whether a
//! job is pending, resume and kill), captured by the [`Scheduler`] trait so
//! that the launch controller can be driven by an in-memory scheduler in
//! tests.
//!
//! # Example
//!
//! ```no_run
//! use spool_client::SchedulerClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SchedulerClient::new(vec!["http://cuebot:8080".to_string()]);
//!
//!     let jobs = client.launch_spec_and_wait("<spec/>").await?;
//!     println!("Launched {} job(s)", jobs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod scheduler;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use scheduler::Scheduler;
pub use spool_core::domain::handle::{JobHandle, JobState, JobStats};

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

/// Request timeout used until the caller overrides it
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the scheduler API
///
/// Holds an ordered list of scheduler hosts. Each request goes to the first
/// host that accepts a connection.
#[derive(Debug, Clone)]
pub struct SchedulerClient {
    /// Base URLs of the scheduler hosts (e.g., "http://localhost:8080")
    hosts: Vec<String>,
    /// Per-request timeout, `None` to wait indefinitely
    timeout: Option<Duration>,
    /// HTTP client instance
    client: Client,
}

impl SchedulerClient {
    /// Create a new scheduler client
    ///
    /// # Arguments
    /// * `hosts` - Base URLs of the scheduler hosts, tried in order
    ///
    /// # Example
    /// ```
    /// use spool_client::SchedulerClient;
    ///
    /// let client = SchedulerClient::new(vec!["http://localhost:8080/".to_string()]);
    /// assert_eq!(client.hosts(), ["http://localhost:8080"]);
    /// ```
    pub fn new(hosts: Vec<String>) -> Self {
        Self::with_client(hosts, Client::new())
    }

    /// Create a new scheduler client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(hosts: Vec<String>, client: Client) -> Self {
        Self {
            hosts: normalize_hosts(hosts),
            timeout: Some(DEFAULT_TIMEOUT),
            client,
        }
    }

    /// Get the configured scheduler hosts
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Get the per-request timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    // =============================================================================
    // Request Dispatch
    // =============================================================================

    /// Send a request to the first reachable host
    ///
    /// `build` receives the host base URL and returns the request to send.
    /// Connection failures move on to the next host; any other outcome,
    /// including an error status, is returned as is.
    async fn execute<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let mut last_error = None;

        for host in &self.hosts {
            let mut request = build(&self.client, host);
            if let Some(timeout) = self.timeout {
                request = request.timeout(timeout);
            }

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() => {
                    warn!("Scheduler host {} unreachable: {}", host, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error.map_or(ClientError::NoHosts, ClientError::from))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle a scheduler response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle a scheduler response that returns no content
    async fn handle_empty_response(&self, response: Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

fn normalize_hosts(hosts: Vec<String>) -> Vec<String> {
    hosts
        .into_iter()
        .map(|host| host.trim().trim_end_matches('/').to_string())
        .filter(|host| !host.is_empty())
        .collect()
}
