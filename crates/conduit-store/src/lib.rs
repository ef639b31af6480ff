//! conduit-store: the `ConnectionStore` contract plus backends.
//!
//! [`memory::InMemoryConnectionStore`] is the required, always-available
//! backend. Enabling the `pg` feature adds [`pg::PgConnectionStore`], a
//! Diesel/r2d2-backed implementation demonstrating the trait is
//! backend-agnostic, as permitted (not required) by the connection store
//! contract.

pub mod error;
pub mod memory;
pub mod store;

#[cfg(feature = "pg")]
pub mod config;
#[cfg(feature = "pg")]
pub mod migrations;
#[cfg(feature = "pg")]
pub mod pg;
#[cfg(feature = "pg")]
pub mod schema;

pub use error::StoreError;
pub use memory::InMemoryConnectionStore;
pub use store::{ConnectionStore, Page, Pagination};
