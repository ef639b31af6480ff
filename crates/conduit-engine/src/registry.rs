//! The in-memory connector/integration catalog. Connections are not held
//! here — they live in the injected `ConnectionStore`; the registry only
//! ever maps ids to the immutable, authored entities.

use std::sync::Arc;

use conduit_domain::{Connector, Integration};
use dashmap::DashMap;

use crate::error::EngineError;

pub struct Registry {
    connectors: DashMap<String, Arc<Connector>>,
    integrations: DashMap<String, Integration>,
}

impl Registry {
    pub fn new() -> Self {
        Self { connectors: DashMap::new(), integrations: DashMap::new() }
    }

    /// Connectors are immutable once registered; re-registering the same id
    /// replaces the catalog entry wholesale rather than mutating it in
    /// place.
    pub fn register_connector(&self, connector: Connector) {
        self.connectors.insert(connector.id.clone(), Arc::new(connector));
    }

    pub fn get_connector(&self, id: &str) -> Option<Arc<Connector>> {
        self.connectors.get(id).map(|e| e.value().clone())
    }

    pub fn connectors(&self) -> Vec<Arc<Connector>> {
        self.connectors.iter().map(|e| e.value().clone()).collect()
    }

    pub fn register_integration(&self, integration: Integration) -> Result<(), EngineError> {
        if !self.connectors.contains_key(&integration.connector_id) {
            return Err(EngineError::NotFound(format!("connector {}", integration.connector_id)));
        }
        if self.integrations.contains_key(&integration.id) {
            return Err(EngineError::AlreadyExists(format!("integration {}", integration.id)));
        }
        self.integrations.insert(integration.id.clone(), integration);
        Ok(())
    }

    pub fn get_integration(&self, id: &str) -> Option<Integration> {
        self.integrations.get(id).map(|e| e.value().clone())
    }

    pub fn integrations(&self) -> Vec<Integration> {
        self.integrations.iter().map(|e| e.value().clone()).collect()
    }

    /// Removes an integration; callers must have already confirmed no
    /// connection still references it.
    pub fn remove_integration(&self, id: &str) -> Result<(), EngineError> {
        self.integrations.remove(id).map(|_| ()).ok_or_else(|| EngineError::NotFound(format!("integration {id}")))
    }

    pub fn clear(&self) {
        self.connectors.clear();
        self.integrations.clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl conduit_exec::ConnectorLookup for Registry {
    fn get(&self, connector_id: &str) -> Option<Arc<Connector>> {
        self.get_connector(connector_id)
    }
}
