//! An integration: a tenant's configured instance of a connector (e.g. "our
//! company Slack workspace"), distinct from a connection, which is a single
//! authenticated account under that integration.

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Integration {
    pub id: String,
    pub connector_id: String,
    pub name: String,
    pub config: Value,
}

impl Integration {
    pub fn new(id: impl Into<String>, connector_id: impl Into<String>, name: impl Into<String>, config: Value) -> Self {
        Self { id: id.into(), connector_id: connector_id.into(), name: name.into(), config }
    }
}
