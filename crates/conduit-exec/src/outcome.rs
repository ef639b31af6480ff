//! The result shape the execution core returns for both actions and syncs.
//! Handler failure after retry exhaustion lands here, not in a `Result::Err`
//! — only lookup and admission failures (connector/connection not found,
//! rate limit denial) are raised as [`crate::error::ExecError`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub execution_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionOutcome {
    pub fn ok(data: Value, execution_time_ms: u64) -> Self {
        Self { success: true, data: Some(data), error: None, execution_time_ms, timestamp: Utc::now() }
    }

    pub fn failed(error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self { success: false, data: None, error: Some(error.into()), execution_time_ms, timestamp: Utc::now() }
    }
}
