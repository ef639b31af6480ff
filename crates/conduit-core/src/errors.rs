//! Errors raised by the flow block library and session manager.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("flow session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    #[error("flow session expired: {0}")]
    SessionExpired(uuid::Uuid),

    #[error("block {0} requires interaction before it can complete")]
    AwaitingInput(String),

    #[error("step {0} failed: {1}")]
    StepFailed(String, String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}
