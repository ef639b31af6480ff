//! The execution core: the single path both scheduled syncs and on-demand
//! actions funnel through. It resolves the connection and its connector,
//! applies rate-limit admission, then the retry/timeout envelope, and for
//! syncs persists the outcome into connection metadata.

use std::sync::Arc;
use std::time::Instant;

use conduit_domain::Connection;
use conduit_ratelimit::RateLimiter;
use conduit_store::ConnectionStore;
use serde_json::Value;

use crate::error::ExecError;
use crate::outcome::ExecutionOutcome;
use crate::registry::ConnectorLookup;
use crate::retry::retry_with_timeout;

pub struct ExecutionCore {
    store: Arc<dyn ConnectionStore>,
    rate_limiter: Arc<RateLimiter>,
    connectors: Arc<dyn ConnectorLookup>,
}

impl ExecutionCore {
    pub fn new(store: Arc<dyn ConnectionStore>, rate_limiter: Arc<RateLimiter>, connectors: Arc<dyn ConnectorLookup>) -> Self {
        Self { store, rate_limiter, connectors }
    }

    async fn load(&self, connection_id: &str) -> Result<(Connection, Arc<conduit_domain::Connector>), ExecError> {
        let connection = self.store.read(connection_id).await?;
        let connector = self
            .connectors
            .get(&connection.connector_id)
            .ok_or_else(|| ExecError::NotFound(format!("connector {}", connection.connector_id)))?;
        Ok((connection, connector))
    }

    /// Returns `Err` only for lookup failures (unknown connection, connector
    /// or action/sync name). Handler failure, timeout and rate-limit denial
    /// are all reported inside `Ok(ExecutionOutcome)`.
    pub async fn execute_action(&self, connection_id: &str, action_name: &str, params: Value) -> Result<ExecutionOutcome, ExecError> {
        let (connection, connector) = self.load(connection_id).await?;
        let action = connector
            .action(action_name)
            .ok_or_else(|| ExecError::NotFound(format!("action {action_name}")))?;

        if let Some(policy) = &connector.rate_limit {
            let key = RateLimiter::generate_key(policy.strategy, &connection.integration_id, &connection.id);
            if let Err(e) = self.rate_limiter.check_limit(&key, policy) {
                tracing::warn!(connection_id, action_name, "rate limit exceeded for action");
                return Ok(ExecutionOutcome::failed(format!("Rate limit exceeded: {e}"), 0));
            }
        }

        let started = Instant::now();
        let handler = action.handler.clone();
        let connection_for_call = connection.clone();
        let result = retry_with_timeout(action.max_retries, action.timeout, move || {
            let handler = handler.clone();
            let params = params.clone();
            let connection = connection_for_call.clone();
            async move { handler.call(params, &connection).await }
        })
        .await;
        let elapsed = started.elapsed().as_millis() as u64;

        Ok(match result {
            Ok(value) => ExecutionOutcome::ok(value, elapsed),
            Err(e) => ExecutionOutcome::failed(e.to_string(), elapsed),
        })
    }

    /// Identical dispatch to [`Self::execute_action`], but on completion
    /// persists a [`conduit_domain::SyncRecord`] into the connection's
    /// metadata via the connection store.
    pub async fn execute_sync(&self, connection_id: &str, sync_name: &str) -> Result<ExecutionOutcome, ExecError> {
        let (mut connection, connector) = self.load(connection_id).await?;
        let sync = connector
            .sync(sync_name)
            .ok_or_else(|| ExecError::NotFound(format!("sync {sync_name}")))?;

        if let Some(policy) = &connector.rate_limit {
            let key = RateLimiter::generate_key(policy.strategy, &connection.integration_id, &connection.id);
            if let Err(e) = self.rate_limiter.check_limit(&key, policy) {
                tracing::warn!(connection_id, sync_name, "rate limit exceeded for sync");
                let outcome = ExecutionOutcome::failed(format!("Rate limit exceeded: {e}"), 0);
                self.persist(&mut connection, sync_name, &outcome).await?;
                return Ok(outcome);
            }
        }

        let started = Instant::now();
        let handler = sync.handler.clone();
        let connection_for_call = connection.clone();
        let result = retry_with_timeout(sync.max_retries, sync.timeout, move || {
            let handler = handler.clone();
            let connection = connection_for_call.clone();
            async move { handler.call(&connection).await }
        })
        .await;
        let elapsed = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(value) => ExecutionOutcome::ok(value, elapsed),
            Err(e) => ExecutionOutcome::failed(e.to_string(), elapsed),
        };
        self.persist(&mut connection, sync_name, &outcome).await?;
        Ok(outcome)
    }

    async fn persist(&self, connection: &mut Connection, sync_name: &str, outcome: &ExecutionOutcome) -> Result<(), ExecError> {
        let record = if outcome.success {
            conduit_domain::SyncRecord::ok(outcome.execution_time_ms, outcome.data.clone().unwrap_or(Value::Null))
        } else {
            conduit_domain::SyncRecord::failed(outcome.execution_time_ms, outcome.error.clone().unwrap_or_default())
        };
        connection.record_sync(sync_name, record);
        self.store.update(connection.clone()).await?;
        Ok(())
    }
}
