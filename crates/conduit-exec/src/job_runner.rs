//! Bridges the scheduler's tick-driven firing to the execution core's sync
//! path. Errors never propagate out of `run` — the scheduler's contract
//! requires a timer callback to log and continue, not panic the tick loop.

use std::sync::Arc;

use async_trait::async_trait;
use conduit_scheduler::JobRunner;

use crate::core::ExecutionCore;

pub struct ExecutionJobRunner {
    core: Arc<ExecutionCore>,
}

impl ExecutionJobRunner {
    pub fn new(core: Arc<ExecutionCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl JobRunner for ExecutionJobRunner {
    async fn run(&self, connection_id: &str, sync_name: &str) {
        match self.core.execute_sync(connection_id, sync_name).await {
            Ok(outcome) if !outcome.success => {
                tracing::warn!(connection_id, sync_name, error = ?outcome.error, "scheduled sync failed");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(connection_id, sync_name, error = %e, "scheduled sync lookup failed");
            }
        }
    }
}
