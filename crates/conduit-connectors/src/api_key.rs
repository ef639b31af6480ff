//! A minimal REST connector authenticated with a single API key: one form,
//! one action, one sync. Exercises the plain (non-OAuth) path through the
//! flow block library.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::block::{BlockHeader, FieldType as BlockFieldType, FlowBlock, FormField};
use conduit_core::Flow;
use conduit_domain::{
    ActionDefinition, ActionHandler, Connection, Connector, DomainError, FieldSchema, FieldType, SchemaDescriptor, SyncDefinition, SyncHandler,
};
use serde_json::Value;

fn config_of(connection: &Connection) -> Result<(&str, &str), DomainError> {
    let api_key = connection.config.get("apiKey").and_then(Value::as_str).ok_or_else(|| DomainError::InvalidArgument("missing apiKey".to_string()))?;
    let base_url = connection.config.get("baseUrl").and_then(Value::as_str).ok_or_else(|| DomainError::InvalidArgument("missing baseUrl".to_string()))?;
    Ok((api_key, base_url))
}

async fn fetch_records(connection: &Connection) -> Result<Value, DomainError> {
    let (api_key, base_url) = config_of(connection)?;
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{base_url}/records"))
        .bearer_auth(api_key)
        .send()
        .await
        .map_err(|e| DomainError::HandlerFailed(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(DomainError::HandlerFailed(format!("http {}", resp.status())));
    }
    resp.json::<Value>().await.map_err(|e| DomainError::HandlerFailed(e.to_string()))
}

struct ListRecordsAction;

#[async_trait]
impl ActionHandler for ListRecordsAction {
    async fn call(&self, _params: Value, connection: &Connection) -> Result<Value, DomainError> {
        fetch_records(connection).await
    }
}

struct SyncRecordsHandler;

#[async_trait]
impl SyncHandler for SyncRecordsHandler {
    async fn call(&self, connection: &Connection) -> Result<Value, DomainError> {
        fetch_records(connection).await
    }
}

fn authentication_flow() -> Flow {
    Flow::builder("api_key_auth")
        .block(
            "credentials",
            FlowBlock::Form {
                header: BlockHeader::new("API credentials").with_description("Enter your API key and the base URL of your account"),
                fields: vec![
                    FormField::new("apiKey", "API Key", BlockFieldType::Password),
                    FormField::new("baseUrl", "Base URL", BlockFieldType::Url),
                ],
            },
        )
        .return_transform(Arc::new(|ctx: &conduit_core::FlowContext| {
            ctx.get("credentials").cloned().ok_or_else(|| conduit_core::FlowError::Internal("credentials missing from context".to_string()))
        }))
        .build()
        .expect("api_key_auth flow is well-formed")
}

/// Builds the `api-key` example connector.
pub fn connector() -> Connector {
    let mut actions = HashMap::new();
    actions.insert(
        "list_records".to_string(),
        ActionDefinition {
            handler: Arc::new(ListRecordsAction),
            input_schema: SchemaDescriptor::default(),
            output_schema: SchemaDescriptor::default(),
            max_retries: 2,
            timeout: Duration::from_secs(10),
        },
    );

    let mut syncs = HashMap::new();
    syncs.insert(
        "sync_records".to_string(),
        SyncDefinition {
            handler: Arc::new(SyncRecordsHandler),
            output_schema: SchemaDescriptor::default(),
            max_retries: 2,
            timeout: Duration::from_secs(30),
        },
    );

    Connector {
        id: "api-key-demo".to_string(),
        name: "API Key Demo".to_string(),
        version: "1.0.0".to_string(),
        author: "conduit".to_string(),
        logo: None,
        doc_url: None,
        description: "A generic bearer-token REST API".to_string(),
        categories: vec!["productivity".to_string()],
        tags: vec!["rest".to_string(), "api-key".to_string()],
        integration_config: SchemaDescriptor::default(),
        connection_config: SchemaDescriptor::new(vec![
            FieldSchema { name: "apiKey".to_string(), field_type: FieldType::String, required: true },
            FieldSchema { name: "baseUrl".to_string(), field_type: FieldType::String, required: true },
        ]),
        authentication_flow: authentication_flow(),
        refresh: None,
        actions,
        syncs,
        rate_limit: None,
    }
}
