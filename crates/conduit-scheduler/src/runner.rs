//! The scheduler itself knows nothing about how a sync executes — it hands
//! each due job to a `JobRunner`, which the engine facade wires to the
//! execution core's `executeSync`.

use async_trait::async_trait;

#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, connection_id: &str, sync_name: &str);
}
