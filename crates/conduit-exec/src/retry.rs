//! The retry/timeout envelope every handler invocation goes through,
//! regardless of whether it is an action or a sync. Applied once here
//! instead of at each handler's authoring site, so the contract is uniform.

use std::future::Future;
use std::time::Duration;

use conduit_domain::DomainError;
use serde_json::Value;

use crate::error::ExecError;

/// Attempts `attempt` up to `max_retries + 1` times, racing each attempt
/// against `timeout`. Waits `2^(n-1)` seconds before the `n`-th retry.
/// Returns the last error once attempts are exhausted.
pub async fn retry_with_timeout<F, Fut>(max_retries: u32, timeout: Duration, mut attempt: F) -> Result<Value, ExecError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, DomainError>>,
{
    let mut last_error = ExecError::Internal("handler never invoked".to_string());

    for attempt_index in 0..=max_retries {
        if attempt_index > 0 {
            let delay = Duration::from_secs(2u64.pow(attempt_index - 1));
            tokio::time::sleep(delay).await;
        }

        match tokio::time::timeout(timeout, attempt()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(attempt = attempt_index, error = %e, "handler attempt failed");
                last_error = ExecError::Upstream(e.to_string());
            }
            Err(_) => {
                tracing::warn!(attempt = attempt_index, timeout_ms = timeout.as_millis() as u64, "handler attempt timed out");
                last_error = ExecError::Timeout(format!("handler exceeded {}ms", timeout.as_millis()));
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = retry_with_timeout(3, Duration::from_secs(1), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Bool(true))
            }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = retry_with_timeout(3, Duration::from_millis(50), move || {
            let c = c.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(DomainError::HandlerFailed("boom".to_string()))
                } else {
                    Ok(Value::Bool(true))
                }
            }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = retry_with_timeout(2, Duration::from_millis(10), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<Value, _>(DomainError::HandlerFailed("boom".to_string()))
            }
        })
        .await;
        assert!(matches!(result, Err(ExecError::Upstream(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn timeout_surfaces_as_timeout_error() {
        let result = retry_with_timeout(0, Duration::from_millis(10), || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Value::Null)
        })
        .await;
        assert!(matches!(result, Err(ExecError::Timeout(_))));
    }
}
