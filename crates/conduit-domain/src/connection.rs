//! A connection: a single authenticated account under an integration, with
//! its own config (tokens, account id, ...), its own recurring-sync
//! schedule, and a record of each sync's last outcome.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured record of a single sync's last run, kept in a connection's
/// metadata bag under the sync's name. Serializes to the plain JSON shape a
/// caller would expect (`{"success":true,"lastRun":"...","executionTimeMs":42}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    pub success: bool,
    pub last_run: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub last_result: Option<Value>,
    pub error: Option<String>,
}

impl SyncRecord {
    pub fn ok(execution_time_ms: u64, result: Value) -> Self {
        Self { success: true, last_run: Utc::now(), execution_time_ms, last_result: Some(result), error: None }
    }

    pub fn failed(execution_time_ms: u64, error: impl Into<String>) -> Self {
        Self { success: false, last_run: Utc::now(), execution_time_ms, last_result: None, error: Some(error.into()) }
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: String,
    pub external_id: String,
    pub integration_id: String,
    pub connector_id: String,
    pub config: Value,
    pub sync_interval_minutes: u32,
    pub active_syncs: HashSet<String>,
    pub metadata: HashMap<String, SyncRecord>,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        external_id: impl Into<String>,
        integration_id: impl Into<String>,
        connector_id: impl Into<String>,
        config: Value,
        sync_interval_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            external_id: external_id.into(),
            integration_id: integration_id.into(),
            connector_id: connector_id.into(),
            config,
            sync_interval_minutes,
            active_syncs: HashSet::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn record_sync(&mut self, sync_name: &str, record: SyncRecord) {
        self.metadata.insert(sync_name.to_string(), record);
    }
}
