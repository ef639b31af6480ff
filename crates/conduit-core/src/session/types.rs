use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::block::RenderPayload;
use crate::context::FlowContext;
use crate::flow::Flow;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum FlowSessionStatus {
    Running,
    AwaitingInput { block_name: String, render: RenderPayload },
    Completed { result: Value },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub block_name: String,
    pub kind: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<String>,
    pub error: Option<String>,
}

impl StepRecord {
    pub fn started(block_name: &str, kind: &'static str) -> Self {
        Self { block_name: block_name.to_string(), kind, started_at: Utc::now(), finished_at: None, outcome: None, error: None }
    }

    pub fn finish(&mut self, outcome: &str) {
        self.finished_at = Some(Utc::now());
        self.outcome = Some(outcome.to_string());
    }

    pub fn finish_failed(&mut self, error: &str) {
        self.finished_at = Some(Utc::now());
        self.outcome = Some("failed".to_string());
        self.error = Some(error.to_string());
    }
}

pub struct FlowSession {
    pub id: Uuid,
    pub flow: Arc<Flow>,
    pub context: FlowContext,
    pub cursor: usize,
    pub status: FlowSessionStatus,
    pub created_at: DateTime<Utc>,
    /// Informational only — when a block last completed or suspended this
    /// session. Expiry is measured from `created_at`, not this field.
    pub last_active_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
}

impl FlowSession {
    pub fn new(flow: Arc<Flow>, context: FlowContext) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            flow,
            context,
            cursor: 0,
            status: FlowSessionStatus::Running,
            created_at: now,
            last_active_at: now,
            steps: Vec::new(),
        }
    }

    pub fn is_expired(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.created_at > ttl
    }
}
