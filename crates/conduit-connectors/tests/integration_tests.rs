use std::sync::Arc;

use conduit_core::{FlowSessionManager, FlowSessionStatus};
use conduit_domain::Connection;
use conduit_exec::{ConnectorLookup, ExecutionCore};
use conduit_ratelimit::RateLimiter;
use conduit_store::{ConnectionStore, InMemoryConnectionStore};
use indexmap::IndexMap;
use serde_json::json;

struct SingleConnectorLookup(Arc<conduit_domain::Connector>);

impl ConnectorLookup for SingleConnectorLookup {
    fn get(&self, connector_id: &str) -> Option<Arc<conduit_domain::Connector>> {
        if connector_id == self.0.id { Some(self.0.clone()) } else { None }
    }
}

#[tokio::test]
async fn api_key_auth_flow_completes_through_the_session_manager() {
    let connector = Arc::new(conduit_connectors::api_key::connector());
    let manager = FlowSessionManager::new();

    let (session_id, status) = manager.start(Arc::new(connector.authentication_flow.clone()), IndexMap::new()).await.unwrap();
    let render = match status {
        FlowSessionStatus::AwaitingInput { render, .. } => render,
        other => panic!("expected the form block to suspend, got {other:?}"),
    };
    assert_eq!(render.kind, "form");

    let status = manager
        .resume(session_id, json!({"apiKey": "secret-key", "baseUrl": "https://api.example.com"}))
        .await
        .unwrap();

    match status {
        FlowSessionStatus::Completed { result } => {
            assert_eq!(result, json!({"apiKey": "secret-key", "baseUrl": "https://api.example.com"}));
        }
        other => panic!("expected the flow to complete, got {other:?}"),
    }
    manager.destroy();
}

#[tokio::test]
async fn oauth_flow_suspends_at_the_authorize_step() {
    let connector = Arc::new(conduit_connectors::oauth::connector());
    let manager = FlowSessionManager::new();

    let (session_id, status) = manager.start(Arc::new(connector.authentication_flow.clone()), IndexMap::new()).await.unwrap();
    assert!(matches!(status, FlowSessionStatus::AwaitingInput { .. }));

    let status = manager
        .resume(
            session_id,
            json!({"clientId": "client-1", "clientSecret": "shh", "instanceUrl": "https://example.my.salesforce.com"}),
        )
        .await
        .unwrap();

    let render = match status {
        FlowSessionStatus::AwaitingInput { block_name, render } => {
            assert_eq!(block_name, "authorize");
            render
        }
        other => panic!("expected the oauth block to suspend, got {other:?}"),
    };
    assert_eq!(render.kind, "oauth");
    assert!(render.data.get("authorizeUrl").and_then(|v| v.as_str()).unwrap().contains("example.my.salesforce.com"));
    manager.destroy();
}

#[tokio::test]
async fn execution_core_rejects_an_action_the_connector_does_not_declare() {
    let connector = Arc::new(conduit_connectors::api_key::connector());
    let store = Arc::new(InMemoryConnectionStore::default());
    store
        .create(Connection::new("conn-1", "ext-1", "int-1", &connector.id, json!({"apiKey": "k", "baseUrl": "https://api.example.com"}), 60))
        .await
        .unwrap();

    let core = ExecutionCore::new(store, Arc::new(RateLimiter::new()), Arc::new(SingleConnectorLookup(connector)));
    let err = core.execute_action("conn-1", "not_a_real_action", json!({})).await.unwrap_err();
    assert!(matches!(err, conduit_exec::ExecError::NotFound(_)));
}
