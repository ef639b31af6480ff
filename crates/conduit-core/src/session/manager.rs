//! Resumable flow session manager.
//!
//! A session is created for a flow and advances block by block: a block
//! that does not require interaction runs to completion immediately and the
//! engine moves on to the next one in the same call; a block that does
//! require interaction stops the session with a render payload and waits
//! for [`FlowSessionManager::resume`] to be called with the caller's
//! answer. Sessions left untouched past the configured TTL are reaped by a
//! background sweep, matching the "no persistence across restart" scope:
//! state lives only in process memory.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration as ChronoDuration;
use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::block::{run_block, BlockOutcome, HttpClient, ReqwestHttpClient};
use crate::context::FlowContext;
use crate::errors::FlowError;
use crate::flow::Flow;
use crate::session::types::{FlowSession, FlowSessionStatus, StepRecord};

pub struct FlowSessionManager {
    sessions: Arc<DashMap<Uuid, Mutex<FlowSession>>>,
    ttl: ChronoDuration,
    http: Arc<dyn HttpClient>,
    sweep: JoinHandle<()>,
}

const DEFAULT_TTL_MINUTES: i64 = 30;
const DEFAULT_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(5 * 60);

impl FlowSessionManager {
    pub fn new() -> Self {
        Self::with_config(StdDuration::from_secs((DEFAULT_TTL_MINUTES * 60) as u64), DEFAULT_SWEEP_INTERVAL, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_config(ttl: StdDuration, sweep_interval: StdDuration, http: Arc<dyn HttpClient>) -> Self {
        let sessions: Arc<DashMap<Uuid, Mutex<FlowSession>>> = Arc::new(DashMap::new());
        let ttl_chrono = ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::minutes(DEFAULT_TTL_MINUTES));
        let sweep = {
            let sessions = sessions.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(sweep_interval);
                loop {
                    interval.tick().await;
                    let mut expired = Vec::new();
                    for entry in sessions.iter() {
                        let session = entry.value().lock().await;
                        if session.is_expired(ttl_chrono) {
                            expired.push(*entry.key());
                        }
                    }
                    for id in expired {
                        sessions.remove(&id);
                        tracing::info!(session_id = %id, "reaped expired flow session");
                    }
                }
            })
        };
        Self { sessions, ttl: ttl_chrono, http, sweep }
    }

    pub async fn start(&self, flow: Arc<Flow>, seed: IndexMap<String, Value>) -> Result<(Uuid, FlowSessionStatus), FlowError> {
        let mut session = FlowSession::new(flow, FlowContext::seed(seed));
        let status = self.advance(&mut session, None).await?;
        let id = session.id;
        self.sessions.insert(id, Mutex::new(session));
        Ok((id, status))
    }

    pub async fn resume(&self, session_id: Uuid, provided: Value) -> Result<FlowSessionStatus, FlowError> {
        let entry = self.sessions.get(&session_id).ok_or(FlowError::SessionNotFound(session_id))?;
        let mut session = entry.lock().await;
        if session.is_expired(self.ttl) {
            return Err(FlowError::SessionExpired(session_id));
        }
        if !matches!(session.status, FlowSessionStatus::AwaitingInput { .. }) {
            return Err(FlowError::InvalidArgument(format!("session {session_id} is not awaiting input")));
        }
        self.advance(&mut session, Some(provided)).await
    }

    pub async fn status(&self, session_id: Uuid) -> Result<FlowSessionStatus, FlowError> {
        let entry = self.sessions.get(&session_id).ok_or(FlowError::SessionNotFound(session_id))?;
        let session = entry.lock().await;
        Ok(session.status.clone())
    }

    /// Removes a session outright, regardless of its status. Idempotent
    /// from the caller's perspective only in the sense that a second call
    /// reports the session as already gone.
    pub async fn delete(&self, session_id: Uuid) -> Result<(), FlowError> {
        self.sessions.remove(&session_id).ok_or(FlowError::SessionNotFound(session_id))?;
        Ok(())
    }

    pub fn destroy(&self) {
        self.sweep.abort();
    }

    async fn advance(&self, session: &mut FlowSession, mut provided: Option<Value>) -> Result<FlowSessionStatus, FlowError> {
        loop {
            if session.cursor >= session.flow.block_order.len() {
                let result = match &session.flow.return_transform {
                    Some(transform) => transform.apply(&session.context)?,
                    None => session.context.as_value(),
                };
                session.status = FlowSessionStatus::Completed { result };
                session.last_active_at = chrono::Utc::now();
                return Ok(session.status.clone());
            }

            let name = session.flow.block_order[session.cursor].clone();
            let block = session
                .flow
                .blocks
                .get(&name)
                .cloned()
                .ok_or_else(|| FlowError::Internal(format!("flow block {name} missing from definition")))?;

            let mut record = StepRecord::started(&name, block.kind_name());
            let outcome = run_block(&block, &session.context, provided.as_ref(), self.http.as_ref()).await;
            provided = None;

            match outcome {
                Ok(BlockOutcome::Complete(value)) => {
                    record.finish("complete");
                    session.steps.push(record);
                    session.context.set(&name, value);
                    session.cursor += 1;
                    session.last_active_at = chrono::Utc::now();
                }
                Ok(BlockOutcome::AwaitingInput(render)) => {
                    record.finish("awaiting_input");
                    session.steps.push(record);
                    session.status = FlowSessionStatus::AwaitingInput { block_name: name, render };
                    session.last_active_at = chrono::Utc::now();
                    return Ok(session.status.clone());
                }
                Err(e) => {
                    record.finish_failed(&e.to_string());
                    session.steps.push(record);
                    session.status = FlowSessionStatus::Failed { error: e.to_string() };
                    session.last_active_at = chrono::Utc::now();
                    return Err(FlowError::StepFailed(name, e.to_string()));
                }
            }
        }
    }
}

impl Default for FlowSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FlowSessionManager {
    fn drop(&mut self) {
        self.sweep.abort();
    }
}
