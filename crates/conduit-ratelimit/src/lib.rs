//! conduit-ratelimit: fixed-window admission control.
//!
//! Each key (an integration id or a connection id, depending on the
//! connector's declared [`RateLimitStrategy`]) gets its own counter that
//! resets every `window`. A single lock per key is enough concurrency
//! safety here; there is no cross-key coordination and no persistence
//! across restarts.

use std::time::{Duration, Instant};

use conduit_domain::{RateLimitPolicy, RateLimitStrategy};
use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
}

struct Window {
    started_at: Instant,
    count: u32,
}

pub struct RateLimiter {
    windows: DashMap<String, Mutex<Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { windows: DashMap::new() }
    }

    /// Builds the counter key for a policy given the ids in scope. Per
    /// [`RateLimitStrategy::PerIntegration`] the connection id is ignored so
    /// all connections under the integration share a budget; per
    /// [`RateLimitStrategy::PerConnection`] each connection gets its own.
    pub fn generate_key(strategy: RateLimitStrategy, integration_id: &str, connection_id: &str) -> String {
        match strategy {
            RateLimitStrategy::PerIntegration => format!("integration:{integration_id}"),
            RateLimitStrategy::PerConnection => format!("connection:{connection_id}"),
        }
    }

    /// Admits or denies a single request against `policy` under `key`.
    /// Resets the window automatically once it has elapsed.
    pub fn check_limit(&self, key: &str, policy: &RateLimitPolicy) -> Result<(), RateLimitError> {
        let entry = self.windows.entry(key.to_string()).or_insert_with(|| Mutex::new(Window { started_at: Instant::now(), count: 0 }));
        let mut window = entry.lock();

        let elapsed = window.started_at.elapsed();
        if elapsed >= policy.window {
            window.started_at = Instant::now();
            window.count = 0;
        }

        if window.count >= policy.max_requests {
            let retry_after = policy.window.saturating_sub(window.started_at.elapsed());
            tracing::warn!(key, "rate limit denial");
            return Err(RateLimitError::RateLimited { retry_after_ms: retry_after.as_millis() as u64 });
        }

        window.count += 1;
        Ok(())
    }

    /// Removes a key's counter entirely, e.g. when its connection is deleted.
    pub fn clear(&self, key: &str) {
        self.windows.remove(key);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max: u32, window: Duration) -> RateLimitPolicy {
        RateLimitPolicy { max_requests: max, window, strategy: RateLimitStrategy::PerConnection }
    }

    #[test]
    fn admits_up_to_the_limit_then_denies() {
        let limiter = RateLimiter::new();
        let p = policy(2, Duration::from_secs(60));
        limiter.check_limit("conn-1", &p).unwrap();
        limiter.check_limit("conn-1", &p).unwrap();
        let err = limiter.check_limit("conn-1", &p).unwrap_err();
        assert!(matches!(err, RateLimitError::RateLimited { .. }));
    }

    #[test]
    fn resets_after_window_elapses() {
        let limiter = RateLimiter::new();
        let p = policy(1, Duration::from_millis(20));
        limiter.check_limit("conn-1", &p).unwrap();
        assert!(limiter.check_limit("conn-1", &p).is_err());
        std::thread::sleep(Duration::from_millis(30));
        limiter.check_limit("conn-1", &p).unwrap();
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new();
        let p = policy(1, Duration::from_secs(60));
        limiter.check_limit("conn-1", &p).unwrap();
        limiter.check_limit("conn-2", &p).unwrap();
    }

    #[test]
    fn generate_key_reflects_strategy() {
        assert_eq!(RateLimiter::generate_key(RateLimitStrategy::PerIntegration, "int-1", "conn-1"), "integration:int-1");
        assert_eq!(RateLimiter::generate_key(RateLimitStrategy::PerConnection, "int-1", "conn-1"), "connection:conn-1");
    }
}
