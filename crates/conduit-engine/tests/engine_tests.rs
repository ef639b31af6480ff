use std::sync::Arc;

use conduit_core::FlowSessionStatus;
use conduit_engine::{Engine, EngineConfig};
use conduit_store::InMemoryConnectionStore;
use indexmap::IndexMap;
use serde_json::json;
use std::time::Duration;

fn test_engine() -> Engine {
    let config = EngineConfig { scheduler_tick: Duration::from_millis(20), ..EngineConfig::default() };
    let engine = Engine::new(Arc::new(InMemoryConnectionStore::default()), config);
    engine.register_connector(conduit_connectors::api_key::connector());
    engine.register_integration(conduit_domain::Integration::new("int-1", "api-key-demo", "Demo", json!({}))).unwrap();
    engine
}

#[tokio::test]
async fn add_connection_rejects_an_unknown_integration() {
    let engine = test_engine();
    let err = engine
        .add_connection(
            "no-such-integration",
            "api-key-demo",
            "acct-1",
            json!({"apiKey": "k", "baseUrl": "https://example.test"}),
            None,
            Vec::<String>::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, conduit_engine::EngineError::NotFound(_)));
    engine.destroy();
}

#[tokio::test]
async fn add_connection_rejects_a_connector_id_that_does_not_match_the_integration() {
    let engine = test_engine();
    engine.register_connector(conduit_connectors::oauth::connector());
    let err = engine
        .add_connection(
            "int-1",
            "crm-oauth",
            "acct-1",
            json!({"apiKey": "k", "baseUrl": "https://example.test"}),
            None,
            Vec::<String>::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, conduit_engine::EngineError::InvalidArgument(_)));
    engine.destroy();
}

#[tokio::test]
async fn auth_flow_session_can_be_deleted_outright() {
    let engine = test_engine();
    let (session_id, _) = engine.start_auth_flow("api-key-demo", IndexMap::new()).await.unwrap();

    engine.remove_flow_session(session_id).await.unwrap();

    let err = engine.auth_flow_status(session_id).await.unwrap_err();
    assert!(matches!(err, conduit_engine::EngineError::SessionExpired(_)));
    engine.destroy();
}

#[tokio::test]
async fn auth_flow_completes_and_connection_can_be_added() {
    let engine = test_engine();

    let (session_id, status) = engine.start_auth_flow("api-key-demo", IndexMap::new()).await.unwrap();
    assert!(matches!(status, FlowSessionStatus::AwaitingInput { .. }));

    let status = engine
        .resume_auth_flow(session_id, json!({"apiKey": "secret-token", "baseUrl": "https://example.test"}))
        .await
        .unwrap();
    let config = match status {
        FlowSessionStatus::Completed { result } => result,
        other => panic!("expected completion, got {other:?}"),
    };

    let connection = engine
        .add_connection("int-1", "api-key-demo", "acct-1", config, Some(30), vec!["sync_records".to_string()])
        .await
        .unwrap();

    assert_eq!(connection.active_syncs.len(), 1);
    assert_eq!(engine.scheduled_jobs().len(), 1);

    engine.destroy();
}

#[tokio::test]
async fn add_connection_rejects_config_missing_required_fields() {
    let engine = test_engine();
    let err = engine
        .add_connection("int-1", "api-key-demo", "acct-1", json!({"apiKey": "only-the-key"}), None, Vec::<String>::new())
        .await
        .unwrap_err();
    assert!(matches!(err, conduit_engine::EngineError::InvalidArgument(_)));
    engine.destroy();
}

#[tokio::test]
async fn add_connection_rejects_an_undeclared_sync_name() {
    let engine = test_engine();
    let err = engine
        .add_connection(
            "int-1",
            "api-key-demo",
            "acct-1",
            json!({"apiKey": "k", "baseUrl": "https://example.test"}),
            None,
            vec!["not_a_real_sync".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, conduit_engine::EngineError::InvalidArgument(_)));
    engine.destroy();
}

#[tokio::test]
async fn activate_and_deactivate_sync_update_the_schedule_and_the_connection() {
    let engine = test_engine();
    let connection = engine
        .add_connection(
            "int-1",
            "api-key-demo",
            "acct-1",
            json!({"apiKey": "k", "baseUrl": "https://example.test"}),
            Some(15),
            Vec::<String>::new(),
        )
        .await
        .unwrap();
    assert!(engine.scheduled_jobs().is_empty());

    engine.activate_sync(&connection.id, "sync_records").await.unwrap();
    assert_eq!(engine.scheduled_jobs().len(), 1);
    let reloaded = engine.get_connection(&connection.id).await.unwrap();
    assert!(reloaded.active_syncs.contains("sync_records"));

    engine.deactivate_sync(&connection.id, "sync_records").await.unwrap();
    assert!(engine.scheduled_jobs().is_empty());
    let reloaded = engine.get_connection(&connection.id).await.unwrap();
    assert!(!reloaded.active_syncs.contains("sync_records"));

    engine.destroy();
}

#[tokio::test]
async fn remove_connection_unschedules_its_jobs() {
    let engine = test_engine();
    let connection = engine
        .add_connection(
            "int-1",
            "api-key-demo",
            "acct-1",
            json!({"apiKey": "k", "baseUrl": "https://example.test"}),
            Some(15),
            vec!["sync_records".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(engine.scheduled_jobs().len(), 1);

    engine.remove_connection(&connection.id).await.unwrap();
    assert!(engine.scheduled_jobs().is_empty());
    assert!(engine.get_connection(&connection.id).await.is_err());

    engine.destroy();
}

#[tokio::test]
async fn remove_integration_fails_while_a_connection_still_references_it() {
    let engine = test_engine();
    engine
        .add_connection(
            "int-1",
            "api-key-demo",
            "acct-1",
            json!({"apiKey": "k", "baseUrl": "https://example.test"}),
            Some(15),
            Vec::<String>::new(),
        )
        .await
        .unwrap();

    let err = engine.remove_integration("int-1").await.unwrap_err();
    assert!(matches!(err, conduit_engine::EngineError::InvalidArgument(_)));

    engine.destroy();
}

#[tokio::test]
async fn destroy_is_idempotent() {
    let engine = test_engine();
    engine.destroy();
    engine.destroy();
}
