//! conduit-domain: the platform's core entities.
//!
//! A `Connector` declares an integration's shape (config schemas,
//! authentication flow, actions, syncs). An `Integration` is a configured
//! instance of a connector; a `Connection` is one authenticated account
//! under an integration. `handler` and `schema` hold the small contracts
//! connectors author against.

pub mod connection;
pub mod connector;
pub mod error;
pub mod handler;
pub mod integration;
pub mod schema;

pub use connection::{Connection, SyncRecord};
pub use connector::{ActionDefinition, Connector, RateLimitPolicy, RateLimitStrategy, SyncDefinition};
pub use error::DomainError;
pub use handler::{ActionHandler, RefreshHandler, SyncHandler};
pub use integration::Integration;
pub use schema::{FieldSchema, FieldType, SchemaDescriptor};
