//! A CRM-style OAuth2 connector: authorization-code exchange, a refresh
//! callback, and a rate-limited sync — modeled on the shape of a typical
//! Salesforce-style integration (instance URL, per-app request budget,
//! access/refresh token pair).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::block::{BlockHeader, FieldType as BlockFieldType, FlowBlock, FormField, OAuthHandler};
use conduit_core::{Flow, FlowContext, FlowError};
use conduit_domain::{
    ActionDefinition, ActionHandler, Connection, Connector, DomainError, FieldSchema, FieldType, RateLimitPolicy, RateLimitStrategy, RefreshHandler,
    SchemaDescriptor, SyncDefinition, SyncHandler,
};
use serde_json::{json, Value};

struct SalesforceOAuthHandler {
    client: reqwest::Client,
}

#[async_trait]
impl OAuthHandler for SalesforceOAuthHandler {
    async fn start(&self, ctx: &FlowContext) -> Result<Value, FlowError> {
        let creds = ctx.get("app_credentials").ok_or_else(|| FlowError::Internal("app_credentials missing".to_string()))?;
        let instance_url = creds.get("instanceUrl").and_then(Value::as_str).ok_or_else(|| FlowError::InvalidArgument("instanceUrl missing".to_string()))?;
        let client_id = creds.get("clientId").and_then(Value::as_str).ok_or_else(|| FlowError::InvalidArgument("clientId missing".to_string()))?;
        let authorize_url = format!("{instance_url}/services/oauth2/authorize?response_type=code&client_id={client_id}");
        Ok(json!({ "authorizeUrl": authorize_url }))
    }

    async fn complete(&self, ctx: &FlowContext, provided: &Value) -> Result<Value, FlowError> {
        let creds = ctx.get("app_credentials").ok_or_else(|| FlowError::Internal("app_credentials missing".to_string()))?;
        let instance_url = creds.get("instanceUrl").and_then(Value::as_str).unwrap_or_default();
        let client_id = creds.get("clientId").and_then(Value::as_str).unwrap_or_default();
        let client_secret = creds.get("clientSecret").and_then(Value::as_str).unwrap_or_default();
        let code = provided.get("code").and_then(Value::as_str).ok_or_else(|| FlowError::InvalidArgument("code missing".to_string()))?;

        let resp = self
            .client
            .post(format!("{instance_url}/services/oauth2/token"))
            .form(&[("grant_type", "authorization_code"), ("code", code), ("client_id", client_id), ("client_secret", client_secret)])
            .send()
            .await
            .map_err(|e| FlowError::Upstream(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FlowError::Upstream(format!("token exchange failed: {}", resp.status())));
        }
        let token: Value = resp.json().await.map_err(|e| FlowError::Upstream(e.to_string()))?;
        Ok(token)
    }
}

struct SalesforceRefreshHandler {
    client: reqwest::Client,
}

#[async_trait]
impl RefreshHandler for SalesforceRefreshHandler {
    async fn call(&self, connection: &Connection) -> Result<Value, DomainError> {
        let instance_url = connection.config.get("instanceUrl").and_then(Value::as_str).unwrap_or_default();
        let client_id = connection.config.get("clientId").and_then(Value::as_str).unwrap_or_default();
        let client_secret = connection.config.get("clientSecret").and_then(Value::as_str).unwrap_or_default();
        let refresh_token = connection
            .config
            .get("refreshToken")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::InvalidArgument("no refresh token on connection".to_string()))?;

        let resp = self
            .client
            .post(format!("{instance_url}/services/oauth2/token"))
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token), ("client_id", client_id), ("client_secret", client_secret)])
            .send()
            .await
            .map_err(|e| DomainError::HandlerFailed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(DomainError::HandlerFailed(format!("token refresh failed: {}", resp.status())));
        }
        let token: Value = resp.json().await.map_err(|e| DomainError::HandlerFailed(e.to_string()))?;

        let mut config = connection.config.clone();
        if let (Some(obj), Some(access_token)) = (config.as_object_mut(), token.get("access_token")) {
            obj.insert("accessToken".to_string(), access_token.clone());
        }
        Ok(config)
    }
}

async fn query_records(connection: &Connection, object_type: &str) -> Result<Value, DomainError> {
    let instance_url = connection.config.get("instanceUrl").and_then(Value::as_str).unwrap_or_default();
    let access_token = connection.config.get("accessToken").and_then(Value::as_str).ok_or_else(|| DomainError::InvalidArgument("no access token on connection".to_string()))?;
    let soql = format!("SELECT Id, Name FROM {object_type}");

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{instance_url}/services/data/v59.0/query"))
        .bearer_auth(access_token)
        .query(&[("q", soql)])
        .send()
        .await
        .map_err(|e| DomainError::HandlerFailed(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(DomainError::HandlerFailed(format!("query failed: {}", resp.status())));
    }
    resp.json::<Value>().await.map_err(|e| DomainError::HandlerFailed(e.to_string()))
}

struct ListAccountsAction;

#[async_trait]
impl ActionHandler for ListAccountsAction {
    async fn call(&self, _params: Value, connection: &Connection) -> Result<Value, DomainError> {
        query_records(connection, "Account").await
    }
}

struct SyncAccountsHandler;

#[async_trait]
impl SyncHandler for SyncAccountsHandler {
    async fn call(&self, connection: &Connection) -> Result<Value, DomainError> {
        query_records(connection, "Account").await
    }
}

fn authentication_flow() -> Flow {
    Flow::builder("oauth_auth")
        .block(
            "app_credentials",
            FlowBlock::Form {
                header: BlockHeader::new("Connect your account").with_description("Provide your connected app's client id/secret and your instance URL"),
                fields: vec![
                    FormField::new("clientId", "Client ID", BlockFieldType::Text),
                    FormField::new("clientSecret", "Client Secret", BlockFieldType::Password),
                    FormField::new("instanceUrl", "Instance URL", BlockFieldType::Url),
                ],
            },
        )
        .block("authorize", FlowBlock::OAuth { header: BlockHeader::new("Authorize"), handler: Arc::new(SalesforceOAuthHandler { client: reqwest::Client::new() }) })
        .block(
            "connection_config",
            FlowBlock::Transform {
                header: BlockHeader::new("Build connection config"),
                transform: Arc::new(|ctx: &FlowContext| {
                    let creds = ctx.get("app_credentials").cloned().unwrap_or(Value::Null);
                    let token = ctx.get("authorize").cloned().unwrap_or(Value::Null);
                    Ok(json!({
                        "clientId": creds.get("clientId"),
                        "clientSecret": creds.get("clientSecret"),
                        "instanceUrl": creds.get("instanceUrl"),
                        "accessToken": token.get("access_token"),
                        "refreshToken": token.get("refresh_token"),
                    }))
                }),
            },
        )
        .return_transform(Arc::new(|ctx: &FlowContext| {
            ctx.get("connection_config").cloned().ok_or_else(|| FlowError::Internal("connection_config missing from context".to_string()))
        }))
        .build()
        .expect("oauth_auth flow is well-formed")
}

/// Builds the `crm-oauth` example connector.
pub fn connector() -> Connector {
    let mut actions = HashMap::new();
    actions.insert(
        "list_accounts".to_string(),
        ActionDefinition {
            handler: Arc::new(ListAccountsAction),
            input_schema: SchemaDescriptor::default(),
            output_schema: SchemaDescriptor::default(),
            max_retries: 2,
            timeout: Duration::from_secs(15),
        },
    );

    let mut syncs = HashMap::new();
    syncs.insert(
        "sync_accounts".to_string(),
        SyncDefinition {
            handler: Arc::new(SyncAccountsHandler),
            output_schema: SchemaDescriptor::default(),
            max_retries: 3,
            timeout: Duration::from_secs(30),
        },
    );

    Connector {
        id: "crm-oauth".to_string(),
        name: "CRM (OAuth)".to_string(),
        version: "1.0.0".to_string(),
        author: "conduit".to_string(),
        logo: None,
        doc_url: None,
        description: "A CRM connected app using the OAuth2 authorization-code flow".to_string(),
        categories: vec!["crm".to_string()],
        tags: vec!["oauth".to_string(), "crm".to_string()],
        integration_config: SchemaDescriptor::default(),
        connection_config: SchemaDescriptor::new(vec![
            FieldSchema { name: "instanceUrl".to_string(), field_type: FieldType::String, required: true },
            FieldSchema { name: "accessToken".to_string(), field_type: FieldType::String, required: true },
        ]),
        authentication_flow: authentication_flow(),
        refresh: Some(Arc::new(SalesforceRefreshHandler { client: reqwest::Client::new() })),
        actions,
        syncs,
        rate_limit: Some(RateLimitPolicy { max_requests: 100, window: Duration::from_secs(60), strategy: RateLimitStrategy::PerConnection }),
    }
}
