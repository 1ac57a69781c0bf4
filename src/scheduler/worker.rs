//! Single worker loop: claim the next job and drive its prompts through
//! the orchestrator in bounded-concurrency chunks.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::job::{Job, JobStatus, PromptResult};
use super::SchedulerInner;
use crate::telemetry::{self, JobSpan};
use crate::workflow::{GenerationRequest, WorkflowOrchestrator};

/// Spawn the worker loop. Returns a handle for shutdown.
pub(super) fn spawn_worker(inner: Arc<SchedulerInner>, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        worker_loop(&inner, shutdown).await;
    })
}

async fn worker_loop(inner: &SchedulerInner, shutdown: CancellationToken) {
    tracing::info!(chunk_size = inner.config.chunk_size, "batch worker started");
    loop {
        if shutdown.is_cancelled() {
            break;
        }
        let Some(job) = inner.store.claim_next() else {
            collect_garbage(inner);
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = inner.notify.notified() => {}
                () = tokio::time::sleep(inner.config.idle_interval) => {}
            }
            continue;
        };

        telemetry::record_queue_depth(inner.store.stats().pending);
        process_job(inner, job).await;
        collect_garbage(inner);

        tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(inner.config.yield_interval) => {}
        }
    }
    tracing::info!("batch worker: shutdown signal received");
}

async fn process_job(inner: &SchedulerInner, mut job: Job) {
    let id = job.id.to_string();
    let span = JobSpan::new(&id, &job.owner_id, job.prompts.len(), job.priority);

    async {
        let started = Instant::now();
        let chunk_size = inner.config.chunk_size.max(1);
        let prompts = job.prompts.clone();

        for chunk in prompts.chunks(chunk_size) {
            let offset = job.results.len();
            let results = run_chunk(&inner.orchestrator, &job.owner_id, offset, chunk).await;
            job.results.extend(results);
            job.updated_at = Utc::now();
            inner.store.update(&job);
            tracing::debug!(completed = job.results.len(), total = prompts.len(), "chunk finished");
        }

        job.status = JobStatus::Completed;
        job.updated_at = Utc::now();
        inner.store.update(&job);

        let failed = job.results.iter().filter(|r| r.is_error()).count();
        let duration_ms = started.elapsed().as_millis() as u64;
        let span = tracing::Span::current();
        span.record("failed_prompts", failed);
        span.record("duration_ms", duration_ms);
        telemetry::record_job_completed(duration_ms);
        tracing::info!(failed, "batch job completed");
    }
    .instrument(span)
    .await;
}

/// Run every prompt of a chunk concurrently. The returned results are in
/// prompt order regardless of completion order.
async fn run_chunk(
    orchestrator: &Arc<WorkflowOrchestrator>,
    owner_id: &str,
    offset: usize,
    chunk: &[String],
) -> Vec<PromptResult> {
    let handles: Vec<_> = chunk
        .iter()
        .map(|prompt| {
            let orchestrator = Arc::clone(orchestrator);
            let request = GenerationRequest::new(owner_id, prompt.clone());
            tokio::spawn(
                async move { orchestrator.process_generation_request(request).await }
                    .instrument(tracing::Span::current()),
            )
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, joined)| match joined {
            Ok(Ok(outcome)) => PromptResult::Outcome(outcome),
            Ok(Err(e)) => prompt_failed(offset + index, e.to_string()),
            Err(e) => prompt_failed(offset + index, format!("prompt task aborted: {e}")),
        })
        .collect()
}

fn prompt_failed(index: usize, message: String) -> PromptResult {
    tracing::warn!(index, error = %message, "batch prompt failed");
    telemetry::record_prompt_failure();
    PromptResult::Error { message }
}

fn collect_garbage(inner: &SchedulerInner) {
    let Ok(retention) = chrono::Duration::from_std(inner.config.retention) else {
        return;
    };
    let Some(cutoff) = Utc::now().checked_sub_signed(retention) else {
        return;
    };
    let evicted = inner.store.evict_terminal_before(cutoff);
    if evicted > 0 {
        tracing::debug!(evicted, "evicted expired jobs");
        telemetry::record_jobs_evicted(evicted);
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
