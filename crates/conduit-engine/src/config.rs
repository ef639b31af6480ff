//! Runtime tunables loaded from the environment, in the same
//! `dotenvy` + `once_cell` shape as `conduit_store::config::StoreConfig`.

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub flow_session_ttl: Duration,
    pub flow_sweep_interval: Duration,
    pub scheduler_tick: Duration,
    pub default_sync_interval_minutes: u32,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self {
            flow_session_ttl: Duration::from_secs(env_u64("FLOW_SESSION_TTL_SECS", 30 * 60)),
            flow_sweep_interval: Duration::from_secs(env_u64("FLOW_SWEEP_INTERVAL_SECS", 5 * 60)),
            scheduler_tick: Duration::from_secs(env_u64("SCHEDULER_TICK_SECS", 1)),
            default_sync_interval_minutes: env_u64("DEFAULT_SYNC_INTERVAL_MINUTES", 60) as u32,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flow_session_ttl: Duration::from_secs(30 * 60),
            flow_sweep_interval: Duration::from_secs(5 * 60),
            scheduler_tick: Duration::from_secs(1),
            default_sync_interval_minutes: 60,
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
