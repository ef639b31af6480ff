//! Execution-core errors. Retry/timeout exhaustion never raises — it
//! surfaces through [`crate::outcome::ExecutionOutcome::error`]. This enum
//! exists for the lookup/admission failures that happen before a handler is
//! ever invoked.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<conduit_store::StoreError> for ExecError {
    fn from(e: conduit_store::StoreError) -> Self {
        match e {
            conduit_store::StoreError::NotFound(m) => ExecError::NotFound(m),
            other => ExecError::Internal(other.to_string()),
        }
    }
}

impl From<conduit_ratelimit::RateLimitError> for ExecError {
    fn from(e: conduit_ratelimit::RateLimitError) -> Self {
        match e {
            conduit_ratelimit::RateLimitError::RateLimited { retry_after_ms } => {
                ExecError::RateLimited { retry_after_ms }
            }
        }
    }
}
