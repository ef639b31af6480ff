//! conduit-core: the flow block library and flow session manager.
//!
//! Components:
//! - `block`: the declarative `FlowBlock` kinds and their uniform run
//!   contract (`run_block`).
//! - `flow`: `Flow`, an ordered collection of named blocks plus an optional
//!   return transform.
//! - `context`: `FlowContext`, the per-session map of completed block
//!   outputs threaded through a flow.
//! - `templated`: values that are either fixed at authoring time or derived
//!   from the context at run time.
//! - `session`: `FlowSessionManager`, the resumable state machine that
//!   suspends at interactive blocks and reaps idle sessions past their TTL.
//! - `errors`: `FlowError`, the error kinds this crate can raise.

pub mod block;
pub mod context;
pub mod errors;
pub mod flow;
pub mod session;
pub mod templated;

pub use block::{BlockHeader, FieldType, FlowBlock, FormField, HttpMethod, OAuthHandler, TransformFn};
pub use context::FlowContext;
pub use errors::FlowError;
pub use flow::{Flow, FlowDefinitionError, ReturnTransform};
pub use session::{FlowSessionManager, FlowSessionStatus};
pub use templated::Templated;
