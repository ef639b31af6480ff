use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::Flow;
use conduit_domain::{
    ActionDefinition, ActionHandler, Connection, Connector, DomainError, RateLimitPolicy, RateLimitStrategy, SchemaDescriptor, SyncDefinition,
    SyncHandler,
};
use conduit_exec::{ConnectorLookup, ExecutionCore};
use conduit_ratelimit::RateLimiter;
use conduit_store::{ConnectionStore, InMemoryConnectionStore};
use serde_json::{json, Value};

fn noop_flow() -> Flow {
    Flow::builder("noop")
        .block("log", conduit_core::block::FlowBlock::Log {
            header: conduit_core::block::BlockHeader::new("Log"),
            message: conduit_core::Templated::literal("hi".to_string()),
        })
        .build()
        .unwrap()
}

struct AlwaysFailsAction {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl ActionHandler for AlwaysFailsAction {
    async fn call(&self, _params: Value, _connection: &Connection) -> Result<Value, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::HandlerFailed("boom".to_string()))
    }
}

struct FailsTwiceThenOkAction {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl ActionHandler for FailsTwiceThenOkAction {
    async fn call(&self, _params: Value, _connection: &Connection) -> Result<Value, DomainError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < 2 {
            Err(DomainError::HandlerFailed("boom".to_string()))
        } else {
            Ok(json!({"ok": true}))
        }
    }
}

struct HangingSync;

#[async_trait]
impl SyncHandler for HangingSync {
    async fn call(&self, _connection: &Connection) -> Result<Value, DomainError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Value::Null)
    }
}

struct EchoSync;

#[async_trait]
impl SyncHandler for EchoSync {
    async fn call(&self, connection: &Connection) -> Result<Value, DomainError> {
        Ok(json!({"connection": connection.id}))
    }
}

struct SingleConnectorLookup(Arc<Connector>);

impl ConnectorLookup for SingleConnectorLookup {
    fn get(&self, connector_id: &str) -> Option<Arc<Connector>> {
        if connector_id == self.0.id { Some(self.0.clone()) } else { None }
    }
}

fn connector_with(actions: HashMap<String, ActionDefinition>, syncs: HashMap<String, SyncDefinition>, rate_limit: Option<RateLimitPolicy>) -> Connector {
    Connector {
        id: "test-connector".to_string(),
        name: "Test Connector".to_string(),
        version: "1.0.0".to_string(),
        author: "tests".to_string(),
        logo: None,
        doc_url: None,
        description: "".to_string(),
        categories: vec![],
        tags: vec![],
        integration_config: SchemaDescriptor::default(),
        connection_config: SchemaDescriptor::default(),
        authentication_flow: noop_flow(),
        refresh: None,
        actions,
        syncs,
        rate_limit,
    }
}

async fn seeded_store(connector_id: &str) -> Arc<InMemoryConnectionStore> {
    let store = Arc::new(InMemoryConnectionStore::default());
    let connection = Connection::new("conn-1", "ext-1", "integration-1", connector_id, json!({}), 60);
    store.create(connection).await.unwrap();
    store
}

#[tokio::test(start_paused = true)]
async fn retry_then_succeed() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut actions = HashMap::new();
    actions.insert(
        "sync_records".to_string(),
        ActionDefinition {
            handler: Arc::new(FailsTwiceThenOkAction { calls: calls.clone() }),
            input_schema: SchemaDescriptor::default(),
            output_schema: SchemaDescriptor::default(),
            max_retries: 3,
            timeout: Duration::from_secs(5),
        },
    );
    let connector = Arc::new(connector_with(actions, HashMap::new(), None));
    let store = seeded_store(&connector.id).await;
    let core = ExecutionCore::new(store, Arc::new(RateLimiter::new()), Arc::new(SingleConnectorLookup(connector)));

    let outcome = core.execute_action("conn-1", "sync_records", json!({})).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.data, Some(json!({"ok": true})));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn exhausts_retries_and_reports_failure_without_raising() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut actions = HashMap::new();
    actions.insert(
        "sync_records".to_string(),
        ActionDefinition {
            handler: Arc::new(AlwaysFailsAction { calls: calls.clone() }),
            input_schema: SchemaDescriptor::default(),
            output_schema: SchemaDescriptor::default(),
            max_retries: 1,
            timeout: Duration::from_secs(5),
        },
    );
    let connector = Arc::new(connector_with(actions, HashMap::new(), None));
    let store = seeded_store(&connector.id).await;
    let core = ExecutionCore::new(store, Arc::new(RateLimiter::new()), Arc::new(SingleConnectorLookup(connector)));

    let outcome = core.execute_action("conn-1", "sync_records", json!({})).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn sync_timeout_surfaces_quickly() {
    let mut syncs = HashMap::new();
    syncs.insert(
        "records".to_string(),
        SyncDefinition { handler: Arc::new(HangingSync), output_schema: SchemaDescriptor::default(), max_retries: 0, timeout: Duration::from_millis(100) },
    );
    let connector = Arc::new(connector_with(HashMap::new(), syncs, None));
    let store = seeded_store(&connector.id).await;
    let core = ExecutionCore::new(store.clone(), Arc::new(RateLimiter::new()), Arc::new(SingleConnectorLookup(connector)));

    let outcome = core.execute_sync("conn-1", "records").await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().to_lowercase().contains("timeout"));

    let persisted = store.read("conn-1").await.unwrap();
    assert!(persisted.metadata.get("records").is_some());
}

#[tokio::test]
async fn rate_limit_denies_third_call_without_invoking_handler() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut syncs = HashMap::new();
    syncs.insert(
        "records".to_string(),
        SyncDefinition { handler: Arc::new(EchoSync), output_schema: SchemaDescriptor::default(), max_retries: 0, timeout: Duration::from_secs(5) },
    );
    let policy = RateLimitPolicy { max_requests: 2, window: Duration::from_secs(60), strategy: RateLimitStrategy::PerConnection };
    let connector = Arc::new(connector_with(HashMap::new(), syncs, Some(policy)));
    let store = seeded_store(&connector.id).await;
    let core = ExecutionCore::new(store, Arc::new(RateLimiter::new()), Arc::new(SingleConnectorLookup(connector)));

    core.execute_sync("conn-1", "records").await.unwrap();
    core.execute_sync("conn-1", "records").await.unwrap();
    let third = core.execute_sync("conn-1", "records").await.unwrap();

    assert!(!third.success);
    assert!(third.error.unwrap().contains("Rate limit exceeded"));
    let _ = calls;
}

#[tokio::test]
async fn unknown_connection_is_a_lookup_error() {
    let connector = Arc::new(connector_with(HashMap::new(), HashMap::new(), None));
    let store = Arc::new(InMemoryConnectionStore::default());
    let core = ExecutionCore::new(store, Arc::new(RateLimiter::new()), Arc::new(SingleConnectorLookup(connector)));

    let err = core.execute_action("missing", "whatever", json!({})).await.unwrap_err();
    assert!(matches!(err, conduit_exec::ExecError::NotFound(_)));
}
