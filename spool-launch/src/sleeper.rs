//! Poll interval sleeping
//!
//! The launcher waits between polls through [`Sleeper`] so tests can run
//! many poll ticks without real time passing.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current task between polls
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
