//! The engine facade's aggregating error type. Maps every downstream
//! crate's error onto the specification's error kinds so a transport layer
//! can translate a single enum into 4xx/5xx without reaching into every
//! subsystem crate.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("flow step failed: {0}")]
    FlowStepFailed(String),
    #[error("session expired or unknown: {0}")]
    SessionExpired(Uuid),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<conduit_core::FlowError> for EngineError {
    fn from(e: conduit_core::FlowError) -> Self {
        match e {
            conduit_core::FlowError::SessionNotFound(id) | conduit_core::FlowError::SessionExpired(id) => EngineError::SessionExpired(id),
            conduit_core::FlowError::InvalidArgument(m) => EngineError::InvalidArgument(m),
            conduit_core::FlowError::StepFailed(block, msg) => EngineError::FlowStepFailed(format!("{block}: {msg}")),
            conduit_core::FlowError::AwaitingInput(m) => EngineError::InvalidArgument(m),
            conduit_core::FlowError::Upstream(m) => EngineError::FlowStepFailed(m),
            conduit_core::FlowError::Internal(m) => EngineError::Internal(m),
        }
    }
}

impl From<conduit_domain::DomainError> for EngineError {
    fn from(e: conduit_domain::DomainError) -> Self {
        match e {
            conduit_domain::DomainError::NotFound(m) => EngineError::NotFound(m),
            conduit_domain::DomainError::AlreadyExists(m) => EngineError::AlreadyExists(m),
            conduit_domain::DomainError::InvalidArgument(m) => EngineError::InvalidArgument(m),
            conduit_domain::DomainError::HandlerFailed(m) => EngineError::FlowStepFailed(m),
            conduit_domain::DomainError::Internal(m) => EngineError::Internal(m),
        }
    }
}

impl From<conduit_store::StoreError> for EngineError {
    fn from(e: conduit_store::StoreError) -> Self {
        match e {
            conduit_store::StoreError::NotFound(m) => EngineError::NotFound(m),
            conduit_store::StoreError::AlreadyExists(m) => EngineError::AlreadyExists(m),
            conduit_store::StoreError::InvalidArgument(m) => EngineError::InvalidArgument(m),
            other => EngineError::Internal(other.to_string()),
        }
    }
}

impl From<conduit_scheduler::SchedulerError> for EngineError {
    fn from(e: conduit_scheduler::SchedulerError) -> Self {
        match e {
            conduit_scheduler::SchedulerError::NotFound(m) => EngineError::NotFound(m),
            conduit_scheduler::SchedulerError::InvalidArgument(m) => EngineError::InvalidArgument(m),
        }
    }
}

impl From<conduit_ratelimit::RateLimitError> for EngineError {
    fn from(e: conduit_ratelimit::RateLimitError) -> Self {
        match e {
            conduit_ratelimit::RateLimitError::RateLimited { retry_after_ms } => EngineError::RateLimited { retry_after_ms },
        }
    }
}

impl From<conduit_exec::ExecError> for EngineError {
    fn from(e: conduit_exec::ExecError) -> Self {
        match e {
            conduit_exec::ExecError::NotFound(m) => EngineError::NotFound(m),
            conduit_exec::ExecError::RateLimited { retry_after_ms } => EngineError::RateLimited { retry_after_ms },
            conduit_exec::ExecError::Timeout(m) => EngineError::FlowStepFailed(m),
            conduit_exec::ExecError::Upstream(m) => EngineError::FlowStepFailed(m),
            conduit_exec::ExecError::Internal(m) => EngineError::Internal(m),
        }
    }
}

impl From<conduit_core::FlowDefinitionError> for EngineError {
    fn from(e: conduit_core::FlowDefinitionError) -> Self {
        EngineError::Internal(e.to_string())
    }
}
