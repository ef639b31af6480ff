use conduit_core::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("handler error: {0}")]
    HandlerFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<FlowError> for DomainError {
    fn from(e: FlowError) -> Self {
        DomainError::HandlerFailed(e.to_string())
    }
}
