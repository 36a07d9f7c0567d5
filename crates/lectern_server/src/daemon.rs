//! The scheduler loop.

use crate::pid::PidLock;
use crate::pipeline::{JobReport, ensure_welcome, run_job};
use crate::schedule::{Schedule, ScheduleType};
use crate::DaemonContext;
use chrono::Utc;
use lectern_config::JobSpec;
use lectern_error::{DaemonError, DaemonErrorKind, LecternResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// How a daemon run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonExit {
    /// Another live daemon holds the PID file
    Refused(u32),
    /// Shut down after a signal
    Stopped,
}

/// Fires scheduled jobs until told to stop.
#[derive(Debug, Clone)]
pub struct Daemon {
    ctx: Arc<DaemonContext>,
}

impl Daemon {
    /// Creates a daemon over `ctx`.
    pub fn new(ctx: DaemonContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Runs until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if signal handlers cannot be installed or startup fails.
    pub async fn run(self) -> LecternResult<DaemonExit> {
        let mut terminate = signal(SignalKind::terminate())
            .map_err(|e| DaemonError::new(DaemonErrorKind::Runtime(e.to_string())))?;
        self.run_until(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                _ = terminate.recv() => info!("Received SIGTERM"),
            }
        })
        .await
    }

    /// Runs until `shutdown` completes.
    ///
    /// In-flight firings are abandoned at shutdown. The PID file is released
    /// on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the PID file cannot be written or a job's cron
    /// expression is invalid. A live daemon is not an error: the run returns
    /// [`DaemonExit::Refused`].
    pub async fn run_until<F>(self, shutdown: F) -> LecternResult<DaemonExit>
    where
        F: Future<Output = ()>,
    {
        let settings = self.ctx.settings();
        let lock = match PidLock::try_acquire(settings.pid_file()) {
            Ok(lock) => lock,
            Err(e) => {
                if let DaemonErrorKind::AlreadyRunning(pid) = e.kind() {
                    warn!(pid, "Daemon already running, refusing to start");
                    return Ok(DaemonExit::Refused(*pid));
                }
                return Err(e.into());
            }
        };

        let timezone = *settings.timezone();
        let mut jobs = Vec::new();
        for job in self.ctx.schedule().jobs() {
            jobs.push((job.clone(), ScheduleType::for_job(job, timezone)?));
        }
        info!(
            pid = lock.pid(),
            jobs = jobs.len(),
            timezone = %timezone,
            workdir = %settings.workdir().display(),
            "Daemon started"
        );

        match ensure_welcome(&self.ctx).await {
            Ok(Some(run)) => info!(path = %run.path().display(), "Welcome lesson written"),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Welcome lesson failed"),
        }

        let mut tasks = JoinSet::new();
        let job_count = jobs.len();
        for (job, schedule) in jobs {
            tasks.spawn(job_loop(Arc::clone(&self.ctx), job, schedule));
        }
        tasks.spawn(health_loop(job_count));

        shutdown.await;
        info!("Shutting down, abandoning in-flight work");
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
        drop(lock);
        Ok(DaemonExit::Stopped)
    }
}

/// Fires `job` on its schedule.
///
/// Firings run in a set owned by the loop, so aborting the loop aborts any
/// firing still in flight.
async fn job_loop(ctx: Arc<DaemonContext>, job: JobSpec, schedule: ScheduleType) {
    let mut firings: JoinSet<LecternResult<JobReport>> = JoinSet::new();
    loop {
        let Some(wait) = schedule.until_next(Utc::now()) else {
            warn!(job = %job.name(), "Schedule exhausted");
            break;
        };
        tracing::debug!(job = %job.name(), seconds = wait.as_secs(), "Waiting for next firing");
        let sleep = tokio::time::sleep(wait);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                Some(result) = firings.join_next(), if !firings.is_empty() => {
                    log_firing(job.name(), result);
                }
            }
        }

        let firing_ctx = Arc::clone(&ctx);
        let firing_job = job.clone();
        firings.spawn(async move { run_job(&firing_ctx, &firing_job).await });
    }
    while let Some(result) = firings.join_next().await {
        log_firing(job.name(), result);
    }
}

fn log_firing(name: &str, result: Result<LecternResult<JobReport>, JoinError>) {
    match result {
        Ok(Ok(JobReport::Lesson(run))) => {
            info!(job = %name, path = %run.path().display(), "Job finished")
        }
        Ok(Ok(JobReport::Summary(report))) => {
            info!(job = %name, lessons = report.lessons().len(), "Job finished")
        }
        Ok(Err(e)) => error!(job = %name, error = %e, "Job failed"),
        Err(e) if e.is_panic() => error!(job = %name, "Job panicked"),
        Err(e) => warn!(job = %name, error = %e, "Job cancelled"),
    }
}

async fn health_loop(jobs: usize) {
    let started = Instant::now();
    let schedule = ScheduleType::hourly();
    while let Some(wait) = schedule.until_next(Utc::now()) {
        tokio::time::sleep(wait).await;
        info!(
            uptime_hours = started.elapsed().as_secs() / 3600,
            jobs,
            "Health check"
        );
    }
}
