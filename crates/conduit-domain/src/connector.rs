//! A connector: a connector author's declaration of what an integration of
//! this kind looks like, what a connection needs, how to authenticate, and
//! what actions/syncs it exposes. Connectors are an immutable catalog entry
//! once registered — the engine never mutates one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use conduit_core::Flow;

use crate::handler::{ActionHandler, RefreshHandler, SyncHandler};
use crate::schema::SchemaDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStrategy {
    PerIntegration,
    PerConnection,
}

#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
    pub strategy: RateLimitStrategy,
}

pub struct ActionDefinition {
    pub handler: Arc<dyn ActionHandler>,
    pub input_schema: SchemaDescriptor,
    pub output_schema: SchemaDescriptor,
    pub max_retries: u32,
    pub timeout: Duration,
}

pub struct SyncDefinition {
    pub handler: Arc<dyn SyncHandler>,
    pub output_schema: SchemaDescriptor,
    pub max_retries: u32,
    pub timeout: Duration,
}

pub struct Connector {
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
    pub logo: Option<String>,
    pub doc_url: Option<String>,
    pub description: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub integration_config: SchemaDescriptor,
    pub connection_config: SchemaDescriptor,
    pub authentication_flow: Flow,
    pub refresh: Option<Arc<dyn RefreshHandler>>,
    pub actions: HashMap<String, ActionDefinition>,
    pub syncs: HashMap<String, SyncDefinition>,
    pub rate_limit: Option<RateLimitPolicy>,
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("syncs", &self.syncs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Connector {
    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    pub fn sync(&self, name: &str) -> Option<&SyncDefinition> {
        self.syncs.get(name)
    }
}
