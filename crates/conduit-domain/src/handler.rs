//! Connector-authored behavior: actions, syncs, and credential refresh.
//!
//! Handlers are deliberately thin — they receive a connection and return a
//! JSON value or fail. Retry, timeout and rate-limit admission are applied
//! uniformly by the execution core, not by the handler itself.

use async_trait::async_trait;
use serde_json::Value;

use crate::connection::Connection;
use crate::error::DomainError;

#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn call(&self, params: Value, connection: &Connection) -> Result<Value, DomainError>;
}

#[async_trait]
pub trait SyncHandler: Send + Sync {
    async fn call(&self, connection: &Connection) -> Result<Value, DomainError>;
}

#[async_trait]
pub trait RefreshHandler: Send + Sync {
    async fn call(&self, connection: &Connection) -> Result<Value, DomainError>;
}
