//! conduit-cli: a terminal demonstration of the engine facade.
//!
//! Registers the bundled example connector, runs its authentication flow to
//! completion, opens a connection, activates its recurring sync, fires an
//! on-demand action, and waits for Ctrl-C to shut everything down cleanly.

use std::sync::Arc;
use std::time::Duration;

use conduit_engine::{Engine, EngineConfig};
use conduit_store::InMemoryConnectionStore;
use indexmap::IndexMap;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env().add_directive("conduit_cli=info".parse().unwrap())).init();

    let config = EngineConfig::from_env();
    let engine = Engine::new(Arc::new(InMemoryConnectionStore::default()), config);
    engine.register_connector(conduit_connectors::api_key::connector());
    engine.register_connector(conduit_connectors::oauth::connector());

    if let Err(e) = run_demo(&engine).await {
        tracing::error!(error = %e, "demo run failed");
    }

    tracing::info!("waiting for ctrl-c to shut down");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = tokio::time::sleep(Duration::from_secs(2)) => {
            tracing::info!("demo window elapsed, shutting down without waiting further for ctrl-c");
        }
    }
    engine.destroy();
    tracing::info!("engine stopped");
}

async fn run_demo(engine: &Engine) -> Result<(), conduit_engine::EngineError> {
    let (session_id, status) = engine.start_auth_flow("api-key-demo", IndexMap::new()).await?;
    tracing::info!(?status, "authentication flow awaiting input");

    let status = engine
        .resume_auth_flow(session_id, json!({"apiKey": "demo-key", "baseUrl": "https://api.example.test"}))
        .await?;
    let connection_config = match status {
        conduit_core::FlowSessionStatus::Completed { result } => result,
        other => {
            tracing::warn!(?other, "authentication flow did not complete in one step");
            return Ok(());
        }
    };

    engine.register_integration(conduit_domain::Integration::new(
        "demo-integration",
        "api-key-demo",
        "Demo Integration",
        json!({}),
    ))?;
    let connection = engine
        .add_connection("demo-integration", "api-key-demo", "demo-account", connection_config, Some(60), vec!["sync_records".to_string()])
        .await?;
    tracing::info!(connection_id = %connection.id, "connection created and sync scheduled");

    let outcome = engine.execute_action(&connection.id, "list_records", json!({})).await?;
    tracing::info!(success = outcome.success, "list_records action finished");

    Ok(())
}
