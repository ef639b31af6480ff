//! In-process periodic job engine. Single-process timer ownership only —
//! there is no coordination across scheduler instances, by design.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::SchedulerError;
use crate::job::{job_id, JobInfo, ScheduledJob};
use crate::runner::JobRunner;

const DEFAULT_TICK: StdDuration = StdDuration::from_secs(1);

pub struct Scheduler {
    jobs: Arc<DashMap<String, ScheduledJob>>,
    shutdown: CancellationToken,
    tick_task: JoinHandle<()>,
    runner: Arc<dyn JobRunner>,
}

impl Scheduler {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self::with_tick(runner, DEFAULT_TICK)
    }

    pub fn with_tick(runner: Arc<dyn JobRunner>, tick: StdDuration) -> Self {
        let jobs: Arc<DashMap<String, ScheduledJob>> = Arc::new(DashMap::new());
        let shutdown = CancellationToken::new();
        let tick_task = {
            let jobs = jobs.clone();
            let runner = runner.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tick);
                loop {
                    tokio::select! {
                        _ = shutdown.cancelled() => {
                            tracing::info!("scheduler shutting down");
                            break;
                        }
                        _ = interval.tick() => {
                            Self::fire_due_jobs(&jobs, &runner).await;
                        }
                    }
                }
            })
        };
        Self { jobs, shutdown, tick_task, runner }
    }

    async fn fire_due_jobs(jobs: &DashMap<String, ScheduledJob>, runner: &Arc<dyn JobRunner>) {
        let now = Utc::now();
        let due: Vec<ScheduledJob> = jobs.iter().filter(|e| e.value().next_run_at <= now).map(|e| e.value().clone()).collect();
        for mut job in due {
            tracing::debug!(job_id = %job.id, "firing scheduled job");
            job.next_run_at = now + job.interval;
            jobs.insert(job.id.clone(), job.clone());
            let runner = runner.clone();
            tokio::spawn(async move {
                runner.run(&job.connection_id, &job.sync_name).await;
            });
        }
    }

    /// Schedules (or replaces) a recurring job for `connection_id`/`sync_name`.
    /// Replacing an existing job resets its next-run time rather than
    /// inheriting the previous job's last run.
    pub fn schedule_job(&self, connection_id: &str, sync_name: &str, interval_minutes: u32) -> Result<String, SchedulerError> {
        if interval_minutes == 0 {
            return Err(SchedulerError::InvalidArgument("interval_minutes must be > 0".to_string()));
        }
        let id = job_id(connection_id, sync_name);
        let interval = chrono::Duration::minutes(interval_minutes as i64);
        let job = ScheduledJob { id: id.clone(), connection_id: connection_id.to_string(), sync_name: sync_name.to_string(), interval, next_run_at: Utc::now() + interval };
        self.jobs.insert(id.clone(), job);
        Ok(id)
    }

    pub fn unschedule_job(&self, job_id: &str) -> Result<(), SchedulerError> {
        self.jobs.remove(job_id).map(|_| ()).ok_or_else(|| SchedulerError::NotFound(job_id.to_string()))
    }

    pub fn unschedule_connection_jobs(&self, connection_id: &str) {
        self.jobs.retain(|_, job| job.connection_id != connection_id);
    }

    pub fn get_jobs(&self) -> Vec<JobInfo> {
        self.jobs.iter().map(|e| JobInfo::from(e.value())).collect()
    }

    pub fn get_jobs_for_connection(&self, connection_id: &str) -> Vec<JobInfo> {
        self.jobs.iter().filter(|e| e.value().connection_id == connection_id).map(|e| JobInfo::from(e.value())).collect()
    }

    /// Runs a job immediately, bypassing its schedule. Does not reset the
    /// job's next scheduled run.
    pub async fn execute_now(&self, job_id: &str) -> Result<(), SchedulerError> {
        let job = self.jobs.get(job_id).map(|e| e.value().clone()).ok_or_else(|| SchedulerError::NotFound(job_id.to_string()))?;
        self.runner.run(&job.connection_id, &job.sync_name).await;
        Ok(())
    }

    /// Stops the tick loop. After this returns, no further job invocations
    /// start.
    pub fn destroy(&self) {
        self.shutdown.cancel();
        self.tick_task.abort();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.tick_task.abort();
    }
}
