use chrono::{DateTime, Utc};

pub fn job_id(connection_id: &str, sync_name: &str) -> String {
    format!("{connection_id}:{sync_name}")
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledJob {
    pub id: String,
    pub connection_id: String,
    pub sync_name: String,
    pub interval: chrono::Duration,
    pub next_run_at: DateTime<Utc>,
}

/// Public, read-only view of a scheduled job returned by `get_jobs`.
#[derive(Debug, Clone)]
pub struct JobInfo {
    pub id: String,
    pub connection_id: String,
    pub sync_name: String,
    pub interval_minutes: i64,
    pub next_run_at: DateTime<Utc>,
}

impl From<&ScheduledJob> for JobInfo {
    fn from(job: &ScheduledJob) -> Self {
        Self {
            id: job.id.clone(),
            connection_id: job.connection_id.clone(),
            sync_name: job.sync_name.clone(),
            interval_minutes: job.interval.num_minutes(),
            next_run_at: job.next_run_at,
        }
    }
}
