use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Timelike, Utc};
use poise::async_trait;
use tracing::{event, field, info, instrument, Level, Span};

use residentclock_common::prelude::*;
use residentclock_storage::prelude::*;

use crate::discord::jobs::ChannelRenamer;

pub(crate) type JobResult = Result<JobReport>;

/// Minutes between firing boundaries.
const BOUNDARY_MINUTES: u32 = 5;
/// Seconds after a boundary during which the window stays open.
const WINDOW_SECONDS: u32 = 1;

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, args: &JobArgs) -> JobResult;
}

pub struct JobArgs {
    pub store: Arc<dyn ConfigStore>,
    pub renamer: Arc<dyn ChannelRenamer>,
    /// The moment the window opened. Every server in a pass uses this same instant.
    pub fired_at: DateTime<Utc>,
}

/// Outcome of a job, counted per server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl AddAssign for JobReport {
    fn add_assign(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// Opens for the first two seconds of every fifth minute, once per boundary.
#[derive(Debug, Default)]
pub(crate) struct FiringWindow {
    last_fired: Option<DateTime<Utc>>,
}

impl FiringWindow {
    pub fn is_open(now: DateTime<Utc>) -> bool {
        now.minute() % BOUNDARY_MINUTES == 0 && now.second() <= WINDOW_SECONDS
    }

    /// The boundary to fire for at `now`, if the window is open and that boundary has not fired yet.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !Self::is_open(now) {
            return None;
        }

        let boundary = now.with_second(0)?.with_nanosecond(0)?;
        if self.last_fired == Some(boundary) {
            return None;
        }

        self.last_fired = Some(boundary);
        Some(boundary)
    }
}

/// What is left of `cooldown` at `now`, counted from the boundary that fired rather than the end of the pass.
pub(crate) fn cooldown_remaining(boundary: DateTime<Utc>, now: DateTime<Utc>, cooldown: Duration) -> Duration {
    let elapsed = (now - boundary).to_std().unwrap_or_default();

    cooldown.saturating_sub(elapsed)
}

/// Poll the clock and run every job whenever the firing window opens. Never returns unless there are no jobs.
#[instrument(level = "debug", name = "residentclock.jobs.scheduler", skip_all, fields(boundary = field::Empty))]
pub(crate) async fn job_scheduler(
    config: &ClocktowerConfig,
    jobs: &[Box<dyn Job>],
    store: Arc<dyn ConfigStore>,
    renamer: Arc<dyn ChannelRenamer>,
) -> Result<()> {
    if jobs.is_empty() {
        info!("Job queue is empty. Skipping...");
        return Ok(());
    }

    let mut poll_interval = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    poll_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let cooldown = Duration::from_secs(config.cooldown_secs);
    let mut window = FiringWindow::default();

    loop {
        _ = poll_interval.tick().await;

        let now = Utc::now();
        let Some(boundary) = window.poll(now) else {
            continue;
        };
        Span::current().record("boundary", field::display(&boundary));

        let args = JobArgs { store: store.clone(), renamer: renamer.clone(), fired_at: now };
        let report = run_jobs(jobs, &args).await;

        info!("Attempted all jobs in this run. Succeeded: {} - Failed: {}", report.succeeded, report.failed);

        if report.succeeded > 0 {
            let remaining = cooldown_remaining(boundary, Utc::now(), cooldown);
            event!(Level::DEBUG, "Cooling down for {}s", remaining.as_secs());
            tokio::time::sleep(remaining).await;
        }
    }
}

/// Run every job once. A job that errors counts as one failure.
pub(crate) async fn run_jobs(jobs: &[Box<dyn Job>], args: &JobArgs) -> JobReport {
    let mut total = JobReport::default();

    for job in jobs {
        match job.run(args).await {
            Ok(report) => total += report,
            Err(e) => {
                event!(Level::ERROR, job = job.name(), "Encountered an error during a background job: {:?}", e);
                total.failed += 1;
            }
        }
    }

    total
}
