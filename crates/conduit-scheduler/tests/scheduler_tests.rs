use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_scheduler::{JobRunner, Scheduler};

struct CountingRunner {
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl JobRunner for CountingRunner {
    async fn run(&self, _connection_id: &str, _sync_name: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn fires_due_job_on_tick() {
    let count = Arc::new(AtomicUsize::new(0));
    let scheduler = Scheduler::with_tick(Arc::new(CountingRunner { count: count.clone() }), Duration::from_millis(10));

    scheduler.schedule_job("conn-1", "sync-a", 1).unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(count.load(Ordering::SeqCst) >= 1);
    scheduler.destroy();
}

#[tokio::test]
async fn unschedule_job_removes_it() {
    let scheduler = Scheduler::new(Arc::new(CountingRunner { count: Arc::new(AtomicUsize::new(0)) }));
    let id = scheduler.schedule_job("conn-1", "sync-a", 15).unwrap();
    assert_eq!(scheduler.get_jobs().len(), 1);
    scheduler.unschedule_job(&id).unwrap();
    assert!(scheduler.get_jobs().is_empty());
    scheduler.destroy();
}

#[tokio::test]
async fn unschedule_connection_jobs_removes_all_for_connection() {
    let scheduler = Scheduler::new(Arc::new(CountingRunner { count: Arc::new(AtomicUsize::new(0)) }));
    scheduler.schedule_job("conn-1", "sync-a", 15).unwrap();
    scheduler.schedule_job("conn-1", "sync-b", 30).unwrap();
    scheduler.schedule_job("conn-2", "sync-a", 15).unwrap();

    scheduler.unschedule_connection_jobs("conn-1");

    assert_eq!(scheduler.get_jobs().len(), 1);
    assert!(scheduler.get_jobs_for_connection("conn-1").is_empty());
    scheduler.destroy();
}

#[tokio::test]
async fn execute_now_runs_without_waiting_for_schedule() {
    let count = Arc::new(AtomicUsize::new(0));
    let scheduler = Scheduler::new(Arc::new(CountingRunner { count: count.clone() }));
    let id = scheduler.schedule_job("conn-1", "sync-a", 60).unwrap();
    scheduler.execute_now(&id).await.unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    scheduler.destroy();
}
