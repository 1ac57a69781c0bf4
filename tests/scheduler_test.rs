//! Batch scheduler tests through the composed runtime.

use std::sync::Arc;
use std::time::Duration;

use forge_core::config::EnvConfig;
use forge_core::generation::{EchoBackend, GenerationStatus};
use forge_core::ledger::{CreditAccount, PlanTier};
use forge_core::scheduler::{JobId, JobStatus, JobView, PriorityQueue, SchedulerError};
use forge_core::{Collaborators, Runtime};
use tokio_util::sync::CancellationToken;

fn fast_config() -> EnvConfig {
    let mut config = EnvConfig::default();
    config.scheduler.idle_interval = Duration::from_millis(10);
    config.scheduler.yield_interval = Duration::from_millis(1);
    config
}

async fn runtime(balance: i64) -> Runtime {
    let runtime = Runtime::new(
        &fast_config(),
        Collaborators::in_memory(Arc::new(EchoBackend::new())),
    );
    runtime
        .ledger
        .open_account(CreditAccount::new("u1", PlanTier::Pro), balance)
        .await
        .unwrap();
    runtime
}

async fn wait_completed(runtime: &Runtime, id: JobId) -> JobView {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let view = runtime.scheduler.get_job(&id).unwrap();
            if view.status == JobStatus::Completed {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job should complete")
}

#[test]
fn priority_queue_orders_by_priority_then_fifo() {
    let mut queue: PriorityQueue<&str> = PriorityQueue::new();
    queue.push("A", 5);
    queue.push("B", 1);
    queue.push("C", 5);

    assert_eq!(queue.pop(), Some("A"));
    assert_eq!(queue.pop(), Some("C"));
    assert_eq!(queue.pop(), Some("B"));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn job_is_pending_until_worker_runs() {
    let runtime = runtime(10).await;
    let id = runtime
        .scheduler
        .add_job("u1", vec!["A".into(), "B".into()], 3);

    let view = runtime.scheduler.get_job(&id).unwrap();
    assert_eq!(view.status, JobStatus::Pending);
    assert_eq!(view.priority, 3);
    assert_eq!(view.prompt_count, 2);
    assert!(view.results.is_none());
    assert_eq!(runtime.scheduler.stats().pending, 1);
}

#[tokio::test]
async fn job_completes_with_results_in_prompt_order() {
    let runtime = runtime(10).await;
    let handle = runtime.scheduler.start(CancellationToken::new());

    let id = runtime
        .scheduler
        .add_job("u1", vec!["A".into(), "B".into()], 3);
    let view = wait_completed(&runtime, id).await;

    let results = view.results.unwrap();
    assert_eq!(results.len(), 2);
    let titles: Vec<_> = results
        .iter()
        .map(|r| r.outcome().unwrap().artifact.as_ref().unwrap()["title"].clone())
        .collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert!(results
        .iter()
        .all(|r| r.outcome().unwrap().status == GenerationStatus::Completed));
    assert_eq!(runtime.ledger.balance("u1").await.unwrap(), 8);

    let stats = runtime.scheduler.stats();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 0);

    handle.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn failed_prompts_do_not_fail_the_job() {
    let runtime = runtime(10).await;
    let handle = runtime.scheduler.start(CancellationToken::new());

    // The echo backend rejects an empty prompt at the draft stage.
    let id = runtime
        .scheduler
        .add_job("u1", vec!["Hero".into(), "  ".into(), "Footer".into()], 1);
    let results = wait_completed(&runtime, id).await.results.unwrap();

    assert!(!results[0].is_error());
    assert!(results[1].is_error());
    assert!(!results[2].is_error());

    handle.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn empty_job_completes_immediately() {
    let runtime = runtime(10).await;
    let handle = runtime.scheduler.start(CancellationToken::new());

    let id = runtime.scheduler.add_job("u1", Vec::new(), 1);
    let view = wait_completed(&runtime, id).await;
    assert_eq!(view.results, Some(Vec::new()));

    handle.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let runtime = runtime(10).await;
    let missing = JobId::new_v4();
    assert!(matches!(
        runtime.scheduler.get_job(&missing),
        Err(SchedulerError::JobNotFound(id)) if id == missing
    ));
}

#[tokio::test]
async fn jobs_are_listed_per_owner() {
    let runtime = runtime(10).await;
    let first = runtime.scheduler.add_job("u1", vec!["A".into()], 1);
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = runtime.scheduler.add_job("u1", vec!["B".into()], 9);
    runtime.scheduler.add_job("u2", vec!["C".into()], 1);

    let ids: Vec<_> = runtime
        .scheduler
        .jobs_for_owner("u1")
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(ids, vec![first, second]);
    assert!(runtime.scheduler.jobs_for_owner("nobody").is_empty());
}

#[tokio::test]
async fn shutdown_leaves_pending_jobs_queued() {
    let runtime = runtime(10).await;
    let token = CancellationToken::new();
    let handle = runtime.scheduler.start(token.clone());
    handle.shutdown(Duration::from_secs(2)).await.unwrap();
    assert!(token.is_cancelled());

    let id = runtime.scheduler.add_job("u1", vec!["A".into()], 1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        runtime.scheduler.get_job(&id).unwrap().status,
        JobStatus::Pending
    );
}
