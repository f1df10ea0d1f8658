//! Launch controller
//!
//! Submits a compiled spec and, depending on the launch mode, returns right
//! away, waits for the job to leave the pending state, or supervises it in
//! test mode.
//!
//! Test mode runs `Running -> Failed | Finished`. Both end states kill the
//! job on the scheduler before returning, so a test never leaves a job
//! behind unless the process itself is killed mid-poll.

use std::sync::Arc;
use std::time::Duration;

use spool_client::{ClientError, JobHandle, JobState, Scheduler};
use spool_core::domain::context::EnvContext;
use spool_core::domain::job::Job;
use spool_core::domain::options::{LaunchMode, LaunchOptions};
use tracing::{debug, error, info, warn};

use crate::config::LauncherConfig;
use crate::error::{LaunchError, Result};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::spec::{CompiledSpec, SpecCompiler};

/// Compiles, submits and optionally supervises jobs
pub struct Launcher<S: Scheduler> {
    scheduler: S,
    compiler: SpecCompiler,
    poll_interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl<S: Scheduler> Launcher<S> {
    /// Creates a launcher that talks to `scheduler`
    pub fn new(scheduler: S, config: LauncherConfig, ctx: EnvContext) -> Self {
        let poll_interval = config.poll_interval;
        Self {
            scheduler,
            compiler: SpecCompiler::new(config, ctx),
            poll_interval,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the sleeper used between polls
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn compiler(&self) -> &SpecCompiler {
        &self.compiler
    }

    /// Compiles the job without submitting it
    pub fn serialize(&self, options: &LaunchOptions, job: &Job) -> Result<CompiledSpec> {
        self.compiler.compile(options, job)
    }

    /// Compiles and submits `job`, then runs the post-submission mode
    ///
    /// Compilation errors are returned before the scheduler is contacted.
    pub async fn launch(&mut self, options: &LaunchOptions, job: &Job) -> Result<JobHandle> {
        let spec = self.serialize(options, job)?;

        // Submission can take a long time on a busy scheduler
        self.scheduler.set_timeout(None);

        if let Some(server) = options.server.as_deref().filter(|s| !s.is_empty()) {
            self.scheduler.set_hosts(vec![server.to_string()]);
            info!("Scheduler host set to: {}", server);
        }

        let handle = self
            .scheduler
            .launch_spec_and_wait(spec.as_str())
            .await
            .map_err(|source| LaunchError::Submission {
                job: job.name.clone(),
                source,
            })?
            .into_iter()
            .next()
            .ok_or_else(|| LaunchError::EmptySubmission {
                job: job.name.clone(),
            })?;

        info!(
            "Launched job {} ({}) with {} layer(s)",
            handle.name,
            handle.id,
            spec.layers().len()
        );

        match options.mode() {
            LaunchMode::Detached => Ok(handle),
            LaunchMode::Wait => {
                self.wait(&handle).await;
                Ok(handle)
            }
            LaunchMode::Test => self.test(handle).await,
        }
    }

    /// Blocks until the scheduler no longer reports the job as pending
    ///
    /// Scheduler errors are logged and polling continues; transient ones at
    /// warn level, rejections at error level.
    pub async fn wait(&self, job: &JobHandle) {
        loop {
            match self.scheduler.is_job_pending(&job.name).await {
                Ok(false) => break,
                Ok(true) => debug!(
                    "waiting on {} job to complete: {}/{}",
                    job.name, job.stats.succeeded_frames, job.stats.total_frames
                ),
                Err(e) if e.is_transient() => warn!(
                    "Scheduler error waiting on job: {}, {}. Will continue to wait.",
                    job.name, e
                ),
                Err(e) => error!(
                    "Scheduler rejected pending query for job: {}, {}. Will continue to wait.",
                    job.name, e
                ),
            }

            self.sleeper.sleep(self.poll_interval).await;
        }
    }

    /// Unpauses and supervises the job, then kills it
    ///
    /// Fails as soon as any frame is dead or eaten. The kill runs on every
    /// exit path; a kill failure is only reported when the test itself
    /// passed.
    pub async fn test(&self, job: JobHandle) -> Result<JobHandle> {
        info!("Entering test mode for job: {}", job.name);

        let outcome = self.supervise(&job).await;
        let cleanup = self.scheduler.kill(&job).await;

        match (outcome, cleanup) {
            (Ok(finished), Ok(())) => Ok(finished),
            (Ok(_), Err(source)) => Err(LaunchError::Cleanup {
                job: job.name,
                source,
            }),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(kill_error)) => {
                warn!("Failed to kill job {} after failed test: {}", job.name, kill_error);
                Err(e)
            }
        }
    }

    async fn supervise(&self, job: &JobHandle) -> Result<JobHandle> {
        let supervision_error = |source: ClientError| LaunchError::Supervision {
            job: job.name.clone(),
            source,
        };

        self.scheduler.resume(job).await.map_err(supervision_error)?;

        loop {
            let current = self.scheduler.get_job(job).await.map_err(supervision_error)?;

            if current.stats.failed_frames() > 0 {
                return Err(LaunchError::JobFailed {
                    job: current.name,
                    dead: current.stats.dead_frames,
                    eaten: current.stats.eaten_frames,
                });
            }

            if current.state == JobState::Finished {
                info!("Test job {} finished", current.name);
                return Ok(current);
            }

            debug!(
                "waiting on {} job to complete: {}/{}",
                current.name, current.stats.succeeded_frames, current.stats.total_frames
            );

            self.sleeper.sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use spool_client::JobStats;
    use spool_core::domain::layer::Layer;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn handle(state: JobState, stats: JobStats) -> JobHandle {
        JobHandle {
            id: Uuid::nil(),
            name: "shotA_comp".to_string(),
            state,
            stats,
            start_time: None,
        }
    }

    fn running() -> JobHandle {
        handle(
            JobState::Pending,
            JobStats {
                running_frames: 2,
                total_frames: 10,
                ..Default::default()
            },
        )
    }

    fn transient() -> ClientError {
        ClientError::api_error(503, "scheduler busy")
    }

    /// In-memory scheduler recording every call
    #[derive(Default)]
    struct MockScheduler {
        hosts: Vec<String>,
        timeout: Option<Option<Duration>>,
        reject: bool,
        no_jobs: bool,
        kill_fails: bool,
        submitted: Mutex<Vec<String>>,
        pending: Mutex<VecDeque<spool_client::Result<bool>>>,
        snapshots: Mutex<VecDeque<spool_client::Result<JobHandle>>>,
        pending_polls: AtomicUsize,
        refreshes: AtomicUsize,
        resumes: AtomicUsize,
        kills: AtomicUsize,
    }

    #[async_trait]
    impl Scheduler for MockScheduler {
        fn set_hosts(&mut self, hosts: Vec<String>) {
            self.hosts = hosts;
        }

        fn set_timeout(&mut self, timeout: Option<Duration>) {
            self.timeout = Some(timeout);
        }

        async fn launch_spec_and_wait(&self, spec: &str) -> spool_client::Result<Vec<JobHandle>> {
            self.submitted.lock().unwrap().push(spec.to_string());
            if self.reject {
                return Err(ClientError::api_error(400, "malformed spec"));
            }
            if self.no_jobs {
                return Ok(Vec::new());
            }
            Ok(vec![running()])
        }

        async fn get_job(&self, _job: &JobHandle) -> spool_client::Result<JobHandle> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            self.snapshots
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(handle(JobState::Finished, JobStats::default())))
        }

        async fn is_job_pending(&self, _name: &str) -> spool_client::Result<bool> {
            self.pending_polls.fetch_add(1, Ordering::SeqCst);
            self.pending.lock().unwrap().pop_front().unwrap_or(Ok(false))
        }

        async fn resume(&self, _job: &JobHandle) -> spool_client::Result<()> {
            self.resumes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn kill(&self, _job: &JobHandle) -> spool_client::Result<()> {
            self.kills.fetch_add(1, Ordering::SeqCst);
            if self.kill_fails {
                return Err(transient());
            }
            Ok(())
        }
    }

    /// Sleeper that only counts ticks
    #[derive(Default)]
    struct CountingSleeper {
        ticks: AtomicUsize,
    }

    #[async_trait]
    impl Sleeper for CountingSleeper {
        async fn sleep(&self, duration: Duration) {
            assert_eq!(duration, Duration::from_secs(5));
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn job() -> Job {
        let mut job = Job::new("shotA_comp", "/shows/a/shotA_comp.outline");
        job.add_layer(Layer::new("beauty", "Render").with_range("1-10"));
        job
    }

    fn launcher(scheduler: MockScheduler) -> (Launcher<MockScheduler>, Arc<CountingSleeper>) {
        let sleeper = Arc::new(CountingSleeper::default());
        let launcher = Launcher::new(
            scheduler,
            LauncherConfig::default(),
            EnvContext::new("jdoe", 1001),
        )
        .with_sleeper(sleeper.clone());
        (launcher, sleeper)
    }

    #[tokio::test]
    async fn test_detached_launch_returns_immediately() {
        let (mut launcher, sleeper) = launcher(MockScheduler::default());

        let job = launcher.launch(&LaunchOptions::default(), &job()).await.unwrap();

        assert_eq!(job.name, "shotA_comp");
        let scheduler = launcher.scheduler();
        assert_eq!(scheduler.timeout, Some(None));
        assert!(scheduler.hosts.is_empty());
        assert_eq!(scheduler.submitted.lock().unwrap().len(), 1);
        assert_eq!(scheduler.pending_polls.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.kills.load(Ordering::SeqCst), 0);
        assert_eq!(sleeper.ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submits_compiled_spec_verbatim() {
        let (mut launcher, _) = launcher(MockScheduler::default());
        let options = LaunchOptions::default();

        let expected = launcher.serialize(&options, &job()).unwrap();
        launcher.launch(&options, &job()).await.unwrap();

        let submitted = launcher.scheduler().submitted.lock().unwrap();
        assert_eq!(submitted[0], expected.as_str());
    }

    #[tokio::test]
    async fn test_server_override_sets_hosts() {
        let (mut launcher, _) = launcher(MockScheduler::default());
        let options = LaunchOptions {
            server: Some("http://cuebot-test:8080".to_string()),
            ..Default::default()
        };

        launcher.launch(&options, &job()).await.unwrap();

        assert_eq!(launcher.scheduler().hosts, vec!["http://cuebot-test:8080"]);
    }

    #[tokio::test]
    async fn test_validation_errors_never_reach_scheduler() {
        let (mut launcher, _) = launcher(MockScheduler::default());
        let empty = Job::new("empty", "/p");

        let err = launcher
            .launch(&LaunchOptions::default(), &empty)
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchError::NoLaunchableWork { .. }));
        let scheduler = launcher.scheduler();
        assert!(scheduler.submitted.lock().unwrap().is_empty());
        assert_eq!(scheduler.timeout, None);
    }

    #[tokio::test]
    async fn test_rejected_submission() {
        let (mut launcher, _) = launcher(MockScheduler {
            reject: true,
            ..Default::default()
        });

        let err = launcher
            .launch(&LaunchOptions::default(), &job())
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchError::Submission { .. }));
        assert!(err.to_string().contains("shotA_comp"));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_submission_without_jobs() {
        let (mut launcher, _) = launcher(MockScheduler {
            no_jobs: true,
            ..Default::default()
        });

        let err = launcher
            .launch(&LaunchOptions::default(), &job())
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchError::EmptySubmission { .. }));
    }

    #[tokio::test]
    async fn test_wait_survives_transient_errors() {
        let scheduler = MockScheduler {
            pending: Mutex::new(VecDeque::from([Err(transient()), Ok(true), Ok(false)])),
            ..Default::default()
        };
        let (mut launcher, sleeper) = launcher(scheduler);
        let options = LaunchOptions {
            wait: true,
            ..Default::default()
        };

        let job = launcher.launch(&options, &job()).await.unwrap();

        assert_eq!(job.name, "shotA_comp");
        let scheduler = launcher.scheduler();
        assert_eq!(scheduler.pending_polls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.kills.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wait_keeps_polling_after_rejection() {
        let scheduler = MockScheduler {
            pending: Mutex::new(VecDeque::from([
                Err(ClientError::api_error(404, "no such job")),
                Err(transient()),
                Ok(false),
            ])),
            ..Default::default()
        };
        let (launcher, sleeper) = launcher(scheduler);

        launcher.wait(&running()).await;

        assert_eq!(launcher.scheduler().pending_polls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_wait_takes_precedence_over_test() {
        let (mut launcher, _) = launcher(MockScheduler::default());
        let options = LaunchOptions {
            wait: true,
            test: true,
            ..Default::default()
        };

        launcher.launch(&options, &job()).await.unwrap();

        let scheduler = launcher.scheduler();
        assert_eq!(scheduler.pending_polls.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.resumes.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.kills.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mode_fails_on_dead_frame_and_kills_once() {
        let dead = handle(
            JobState::Pending,
            JobStats {
                dead_frames: 1,
                total_frames: 10,
                ..Default::default()
            },
        );
        let scheduler = MockScheduler {
            snapshots: Mutex::new(VecDeque::from([Ok(running()), Ok(dead)])),
            ..Default::default()
        };
        let (mut launcher, sleeper) = launcher(scheduler);
        let options = LaunchOptions {
            test: true,
            ..Default::default()
        };

        let err = launcher.launch(&options, &job()).await.unwrap_err();

        assert!(matches!(err, LaunchError::JobFailed { dead: 1, eaten: 0, .. }));
        assert!(err.to_string().contains("shotA_comp"));
        let scheduler = launcher.scheduler();
        assert_eq!(scheduler.resumes.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.refreshes.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.kills.load(Ordering::SeqCst), 1);
        assert_eq!(sleeper.ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mode_finishes_and_still_kills() {
        let scheduler = MockScheduler {
            snapshots: Mutex::new(VecDeque::from([
                Ok(running()),
                Ok(running()),
                Ok(handle(
                    JobState::Finished,
                    JobStats {
                        succeeded_frames: 10,
                        total_frames: 10,
                        ..Default::default()
                    },
                )),
            ])),
            ..Default::default()
        };
        let (mut launcher, sleeper) = launcher(scheduler);
        let options = LaunchOptions {
            test: true,
            ..Default::default()
        };

        let job = launcher.launch(&options, &job()).await.unwrap();

        assert_eq!(job.state, JobState::Finished);
        assert_eq!(job.stats.succeeded_frames, 10);
        assert_eq!(launcher.scheduler().kills.load(Ordering::SeqCst), 1);
        assert_eq!(sleeper.ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mode_eaten_frames_fail() {
        let eaten = handle(
            JobState::Pending,
            JobStats {
                eaten_frames: 3,
                ..Default::default()
            },
        );
        let scheduler = MockScheduler {
            snapshots: Mutex::new(VecDeque::from([Ok(eaten)])),
            ..Default::default()
        };
        let (launcher, _) = launcher(scheduler);

        let err = launcher.test(running()).await.unwrap_err();

        assert!(matches!(err, LaunchError::JobFailed { eaten: 3, .. }));
        assert_eq!(launcher.scheduler().kills.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mode_communication_error_still_kills() {
        let scheduler = MockScheduler {
            snapshots: Mutex::new(VecDeque::from([Err(transient())])),
            ..Default::default()
        };
        let (launcher, _) = launcher(scheduler);

        let err = launcher.test(running()).await.unwrap_err();

        assert!(matches!(err, LaunchError::Supervision { .. }));
        assert!(err.to_string().contains("shotA_comp"));
        assert_eq!(launcher.scheduler().kills.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mode_kill_failure_after_success() {
        let scheduler = MockScheduler {
            kill_fails: true,
            ..Default::default()
        };
        let (launcher, _) = launcher(scheduler);

        let err = launcher.test(running()).await.unwrap_err();

        assert!(matches!(err, LaunchError::Cleanup { .. }));
    }

    #[tokio::test]
    async fn test_mode_kill_failure_keeps_original_error() {
        let dead = handle(
            JobState::Pending,
            JobStats {
                dead_frames: 2,
                ..Default::default()
            },
        );
        let scheduler = MockScheduler {
            kill_fails: true,
            snapshots: Mutex::new(VecDeque::from([Ok(dead)])),
            ..Default::default()
        };
        let (launcher, _) = launcher(scheduler);

        let err = launcher.test(running()).await.unwrap_err();

        assert!(matches!(err, LaunchError::JobFailed { dead: 2, .. }));
    }
}
