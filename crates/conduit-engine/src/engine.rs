//! The engine facade: the single entry point wiring the flow session
//! manager, scheduler, execution core, rate limiter and connection store
//! into the operations a caller (the CLI, or any future transport) invokes.

use std::sync::Arc;

use chrono::Utc;
use conduit_core::block::ReqwestHttpClient;
use conduit_core::{Flow, FlowSessionManager, FlowSessionStatus};
use conduit_domain::{Connection, Connector, Integration};
use conduit_exec::{ExecutionCore, ExecutionJobRunner, ExecutionOutcome};
use conduit_ratelimit::RateLimiter;
use conduit_scheduler::{job_id, JobRunner, Scheduler};
use conduit_store::{ConnectionStore, Page, Pagination};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::registry::Registry;

pub struct Engine {
    registry: Arc<Registry>,
    store: Arc<dyn ConnectionStore>,
    flows: FlowSessionManager,
    scheduler: Scheduler,
    exec: Arc<ExecutionCore>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(store: Arc<dyn ConnectionStore>, config: EngineConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let rate_limiter = Arc::new(RateLimiter::new());
        let exec = Arc::new(ExecutionCore::new(store.clone(), rate_limiter, registry.clone()));
        let flows = FlowSessionManager::with_config(
            config.flow_session_ttl,
            config.flow_sweep_interval,
            Arc::new(ReqwestHttpClient::new()),
        );
        let runner: Arc<dyn JobRunner> = Arc::new(ExecutionJobRunner::new(exec.clone()));
        let scheduler = Scheduler::with_tick(runner, config.scheduler_tick);
        Self { registry, store, flows, scheduler, exec, config }
    }

    pub fn with_defaults(store: Arc<dyn ConnectionStore>) -> Self {
        Self::new(store, EngineConfig::default())
    }

    // -- Catalog --------------------------------------------------------

    pub fn register_connector(&self, connector: Connector) {
        self.registry.register_connector(connector);
    }

    pub fn get_connector(&self, connector_id: &str) -> Option<Arc<Connector>> {
        self.registry.get_connector(connector_id)
    }

    pub fn register_integration(&self, integration: Integration) -> Result<(), EngineError> {
        self.registry.register_integration(integration).map_err(Into::into)
    }

    pub fn get_integration(&self, integration_id: &str) -> Option<Integration> {
        self.registry.get_integration(integration_id)
    }

    /// Fails if any connection under this engine's store still references
    /// the integration.
    pub async fn remove_integration(&self, integration_id: &str) -> Result<(), EngineError> {
        let page = self.store.read_all(Pagination::new(1, u32::MAX)).await?;
        if page.items.iter().any(|c| c.integration_id == integration_id) {
            return Err(EngineError::InvalidArgument(format!(
                "integration {integration_id} still has connections attached"
            )));
        }
        self.registry.remove_integration(integration_id).map_err(Into::into)
    }

    // -- Authentication flows --------------------------------------------

    pub async fn start_auth_flow(&self, connector_id: &str, seed: IndexMap<String, Value>) -> Result<(Uuid, FlowSessionStatus), EngineError> {
        let connector = self
            .registry
            .get_connector(connector_id)
            .ok_or_else(|| EngineError::NotFound(format!("connector {connector_id}")))?;
        let flow: Flow = connector.authentication_flow.clone();
        flow.validate()?;
        self.flows.start(Arc::new(flow), seed).await.map_err(Into::into)
    }

    pub async fn resume_auth_flow(&self, session_id: Uuid, provided: Value) -> Result<FlowSessionStatus, EngineError> {
        self.flows.resume(session_id, provided).await.map_err(Into::into)
    }

    pub async fn auth_flow_status(&self, session_id: Uuid) -> Result<FlowSessionStatus, EngineError> {
        self.flows.status(session_id).await.map_err(Into::into)
    }

    pub async fn remove_flow_session(&self, session_id: Uuid) -> Result<(), EngineError> {
        self.flows.delete(session_id).await.map_err(Into::into)
    }

    // -- Connections ------------------------------------------------------

    /// Validates `config` against the connector's declared connection
    /// schema, persists the connection, then schedules its active syncs.
    /// A scheduling failure rolls back the schedule only — the persisted
    /// connection is left in the store, since the store write already
    /// succeeded and is the source of truth a caller can retry scheduling
    /// against.
    pub async fn add_connection(
        &self,
        integration_id: &str,
        connector_id: &str,
        external_id: impl Into<String>,
        config: Value,
        sync_interval_minutes: Option<u32>,
        active_syncs: impl IntoIterator<Item = String>,
    ) -> Result<Connection, EngineError> {
        let integration = self
            .registry
            .get_integration(integration_id)
            .ok_or_else(|| EngineError::NotFound(format!("integration {integration_id}")))?;
        if integration.connector_id != connector_id {
            return Err(EngineError::InvalidArgument(format!(
                "connector {connector_id} does not match integration {integration_id}'s connector {}",
                integration.connector_id
            )));
        }
        let connector = self
            .registry
            .get_connector(connector_id)
            .ok_or_else(|| EngineError::NotFound(format!("connector {connector_id}")))?;
        connector.connection_config.validate(&config)?;

        let interval = sync_interval_minutes.unwrap_or(self.config.default_sync_interval_minutes);
        let mut connection = Connection::new(Uuid::new_v4().to_string(), external_id, integration_id, connector_id, config, interval);
        for sync_name in active_syncs {
            if connector.sync(&sync_name).is_none() {
                return Err(EngineError::InvalidArgument(format!("connector {connector_id} has no sync named {sync_name}")));
            }
            connection.active_syncs.insert(sync_name);
        }

        let created = self.store.create(connection).await?;

        for sync_name in created.active_syncs.iter() {
            if let Err(e) = self.scheduler.schedule_job(&created.id, sync_name, created.sync_interval_minutes) {
                self.scheduler.unschedule_connection_jobs(&created.id);
                return Err(e.into());
            }
        }
        Ok(created)
    }

    pub async fn get_connection(&self, id: &str) -> Result<Connection, EngineError> {
        self.store.read(id).await.map_err(Into::into)
    }

    pub async fn list_connections(&self, page: Pagination) -> Result<Page<Connection>, EngineError> {
        self.store.read_all(page).await.map_err(Into::into)
    }

    /// Unschedules every job for the connection before deleting it from the
    /// store, so no in-flight or future tick can race a deleted connection.
    pub async fn remove_connection(&self, id: &str) -> Result<(), EngineError> {
        self.scheduler.unschedule_connection_jobs(id);
        self.store.delete(id).await.map_err(Into::into)
    }

    pub async fn activate_sync(&self, connection_id: &str, sync_name: &str) -> Result<(), EngineError> {
        let mut connection = self.store.read(connection_id).await?;
        let connector = self
            .registry
            .get_connector(&connection.connector_id)
            .ok_or_else(|| EngineError::NotFound(format!("connector {}", connection.connector_id)))?;
        if connector.sync(sync_name).is_none() {
            return Err(EngineError::InvalidArgument(format!("connector {} has no sync named {sync_name}", connection.connector_id)));
        }
        self.scheduler.schedule_job(connection_id, sync_name, connection.sync_interval_minutes)?;
        connection.active_syncs.insert(sync_name.to_string());
        if let Err(e) = self.store.update(connection).await {
            let _ = self.scheduler.unschedule_job(&job_id(connection_id, sync_name));
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn deactivate_sync(&self, connection_id: &str, sync_name: &str) -> Result<(), EngineError> {
        let mut connection = self.store.read(connection_id).await?;
        let id = job_id(connection_id, sync_name);
        let was_scheduled = match self.scheduler.unschedule_job(&id) {
            Ok(()) => true,
            Err(conduit_scheduler::SchedulerError::NotFound(_)) => false,
            Err(e) => return Err(e.into()),
        };
        connection.active_syncs.remove(sync_name);
        if let Err(e) = self.store.update(connection).await {
            if was_scheduled {
                let _ = self.scheduler.schedule_job(connection_id, sync_name, self.config.default_sync_interval_minutes);
            }
            return Err(e.into());
        }
        Ok(())
    }

    // -- Execution ----------------------------------------------------------

    pub async fn execute_action(&self, connection_id: &str, action_name: &str, params: Value) -> Result<ExecutionOutcome, EngineError> {
        self.exec.execute_action(connection_id, action_name, params).await.map_err(Into::into)
    }

    pub async fn execute_sync(&self, connection_id: &str, sync_name: &str) -> Result<ExecutionOutcome, EngineError> {
        self.exec.execute_sync(connection_id, sync_name).await.map_err(Into::into)
    }

    pub fn scheduled_jobs(&self) -> Vec<conduit_scheduler::JobInfo> {
        self.scheduler.get_jobs()
    }

    pub fn now(&self) -> chrono::DateTime<Utc> {
        Utc::now()
    }

    /// Idempotent shutdown: stops the scheduler's tick loop and the flow
    /// session sweep, then clears the catalog. Safe to call more than once.
    pub fn destroy(&self) {
        self.scheduler.destroy();
        self.flows.destroy();
        self.registry.clear();
    }
}
