//! Required in-memory `ConnectionStore` implementation.

use async_trait::async_trait;
use conduit_domain::Connection;
use indexmap::IndexMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::store::{ConnectionStore, Page, Pagination};

#[derive(Default)]
pub struct InMemoryConnectionStore {
    connections: RwLock<IndexMap<String, Connection>>,
}

impl InMemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn create(&self, connection: Connection) -> Result<Connection, StoreError> {
        let mut guard = self.connections.write().expect("lock poisoned");
        if guard.contains_key(&connection.id) {
            return Err(StoreError::AlreadyExists(connection.id));
        }
        guard.insert(connection.id.clone(), connection.clone());
        Ok(connection)
    }

    async fn read(&self, id: &str) -> Result<Connection, StoreError> {
        let guard = self.connections.read().expect("lock poisoned");
        guard.get(id).cloned().ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn read_all(&self, page: Pagination) -> Result<Page<Connection>, StoreError> {
        let guard = self.connections.read().expect("lock poisoned");
        let total = guard.len() as u64;
        let items = guard
            .values()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn update(&self, connection: Connection) -> Result<Connection, StoreError> {
        let mut guard = self.connections.write().expect("lock poisoned");
        if !guard.contains_key(&connection.id) {
            return Err(StoreError::NotFound(connection.id));
        }
        guard.insert(connection.id.clone(), connection.clone());
        Ok(connection)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut guard = self.connections.write().expect("lock poisoned");
        guard.shift_remove(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conn(id: &str) -> Connection {
        Connection::new(id, "ext", "int-1", "demo", json!({}), 15)
    }

    #[tokio::test]
    async fn create_then_read_roundtrips() {
        let store = InMemoryConnectionStore::new();
        store.create(conn("c1")).await.unwrap();
        let read = store.read("c1").await.unwrap();
        assert_eq!(read.id, "c1");
    }

    #[tokio::test]
    async fn create_twice_fails() {
        let store = InMemoryConnectionStore::new();
        store.create(conn("c1")).await.unwrap();
        let err = store.create(conn("c1")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn read_all_paginates() {
        let store = InMemoryConnectionStore::new();
        for i in 0..5 {
            store.create(conn(&format!("c{i}"))).await.unwrap();
        }
        let page = store.read_all(Pagination::new(2, 2)).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "c2");
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);
    }

    #[tokio::test]
    async fn read_all_reports_pagination_metadata_on_the_last_page() {
        let store = InMemoryConnectionStore::new();
        for i in 0..5 {
            store.create(conn(&format!("c{i}"))).await.unwrap();
        }
        let page = store.read_all(Pagination::new(3, 2)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[tokio::test]
    async fn delete_removes_connection() {
        let store = InMemoryConnectionStore::new();
        store.create(conn("c1")).await.unwrap();
        store.delete("c1").await.unwrap();
        assert!(matches!(store.read("c1").await.unwrap_err(), StoreError::NotFound(_)));
    }
}
