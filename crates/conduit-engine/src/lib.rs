//! conduit-engine: the facade binding the flow session manager, scheduler,
//! execution core, rate limiter and connection store into the operations a
//! caller invokes — registering connectors and integrations, running
//! authentication flows to produce connections, activating recurring syncs,
//! and firing on-demand actions. Deliberately has no HTTP/route layer of its
//! own; a transport is a thin wrapper around [`Engine`].

mod config;
mod engine;
mod error;
mod registry;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use registry::Registry;
