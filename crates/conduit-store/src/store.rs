//! The `ConnectionStore` contract. Alternate backends (see [`crate::pg`])
//! are permitted as long as they honor these return shapes.

use async_trait::async_trait;
use conduit_domain::Connection;

use crate::error::StoreError;

/// A 1-indexed page request: `page` 1 is the first page.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: page.max(1), limit }
    }

    /// The number of rows to skip to reach this page, for backends that
    /// page via offset/limit.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let limit = pagination.limit.max(1);
        let total_pages = ((total + limit as u64 - 1) / limit as u64).max(1) as u32;
        let page = pagination.page;
        Self { items, total, page, limit, total_pages, has_next: page < total_pages, has_prev: page > 1 }
    }
}

#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn create(&self, connection: Connection) -> Result<Connection, StoreError>;
    async fn read(&self, id: &str) -> Result<Connection, StoreError>;
    async fn read_all(&self, page: Pagination) -> Result<Page<Connection>, StoreError>;
    async fn update(&self, connection: Connection) -> Result<Connection, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
