//! Scheduler - one timer task per job, feeding the dispatcher queue

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use contracts::{JobConfig, ScheduleConfig};
use dispatcher::{BroadcastJob, BroadcastQueue};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::clock::{Clock, SystemClock};
use crate::error::SchedulerError;
use crate::trigger::next_fire;

/// Running schedule
pub struct Scheduler {
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl Scheduler {
    /// Start every job of `schedule` against the system clock
    ///
    /// # Errors
    /// See [`Scheduler::start_with_clock`].
    pub fn start(
        schedule: &ScheduleConfig,
        queue: BroadcastQueue,
        startup: DateTime<Utc>,
    ) -> Result<Self, SchedulerError> {
        Self::start_with_clock(schedule, queue, startup, SystemClock)
    }

    /// Start every job of `schedule`, reading wall-clock time from `clock`
    ///
    /// Must be called inside a tokio runtime. Nothing is spawned unless
    /// every job has a fire time.
    ///
    /// # Errors
    /// - `InvalidZone` if `utc_offset` does not parse
    /// - `InvalidTrigger` if a job names a time of day that does not exist
    #[instrument(name = "scheduler_start", skip_all, fields(jobs = schedule.jobs.len()))]
    pub fn start_with_clock<C: Clock>(
        schedule: &ScheduleConfig,
        queue: BroadcastQueue,
        startup: DateTime<Utc>,
        clock: C,
    ) -> Result<Self, SchedulerError> {
        let zone = schedule.offset()?;
        let startup = startup.with_timezone(&zone);
        let now = clock.now().with_timezone(&zone);

        for job in &schedule.jobs {
            if next_fire(&job.trigger, startup, now).is_none() {
                return Err(SchedulerError::InvalidTrigger {
                    job_id: job.id.clone(),
                    trigger: format!("{:?}", job.trigger),
                });
            }
        }

        let clock = Arc::new(clock);
        let tasks = schedule
            .jobs
            .iter()
            .map(|job| {
                let task = run_job(job.clone(), startup, Arc::clone(&clock), queue.clone());
                (job.id.clone(), tokio::spawn(task))
            })
            .collect();

        info!(zone = %zone, startup = %startup, "Scheduler started");
        Ok(Self { tasks })
    }

    /// Scheduled job ids, in configuration order
    pub fn job_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancel every job task
    ///
    /// Jobs already enqueued stay with the dispatcher.
    #[instrument(name = "scheduler_shutdown", skip(self))]
    pub async fn shutdown(self) {
        for (_, task) in &self.tasks {
            task.abort();
        }
        for (job_id, task) in self.tasks {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!(job_id = %job_id, "Scheduler job panicked");
                }
            }
        }
        debug!("Scheduler shutdown complete");
    }
}

/// Sleep until each fire time, then enqueue; forever
async fn run_job<C: Clock>(
    job: JobConfig,
    startup: DateTime<FixedOffset>,
    clock: Arc<C>,
    queue: BroadcastQueue,
) {
    let zone = startup.timezone();
    let mut after = clock.now().with_timezone(&zone);

    loop {
        let Some(fire_at) = next_fire(&job.trigger, startup, after) else {
            error!(job_id = %job.id, trigger = ?job.trigger, "Job has no fire time, stopping");
            return;
        };

        let now = clock.now().with_timezone(&zone);
        let wait = (fire_at - now).to_std().unwrap_or_default();
        info!(job_id = %job.id, next_run = %fire_at, "Next run scheduled");
        tokio::time::sleep(wait).await;

        if queue.try_enqueue(BroadcastJob::new(&job.id, &job.message)) {
            info!(job_id = %job.id, "Broadcast job enqueued");
        }

        // Never fire the same instant twice, even if the clock lags
        after = fire_at.max(clock.now().with_timezone(&zone));
    }
}
