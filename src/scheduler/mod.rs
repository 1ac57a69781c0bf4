//! Batch scheduling module for Forge CORE.
//!
//! A priority-ordered job queue drained by one continuous worker. Jobs are
//! processed one at a time; a job's prompts run concurrently in fixed-size
//! chunks.

mod job;
mod priority;
mod store;
mod worker;

pub use job::{Job, JobId, JobStatus, JobView, PromptResult};
pub use priority::{Priority, PriorityQueue, DEFAULT_PRIORITY};
pub use store::{InMemoryJobStore, JobStore, QueueStats};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::workflow::WorkflowOrchestrator;

/// Configuration for the batch scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Prompts per chunk; also the in-chunk concurrency.
    pub chunk_size: usize,
    /// Wait between polls of an empty queue.
    pub idle_interval: Duration,
    /// Pause between loop iterations after a job.
    pub yield_interval: Duration,
    /// Terminal jobs older than this are evicted.
    pub retention: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            idle_interval: Duration::from_secs(1),
            yield_interval: Duration::from_millis(10),
            retention: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Worker did not stop within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("Worker task failed: {0}")]
    WorkerPanicked(String),
}

pub(crate) struct SchedulerInner {
    orchestrator: Arc<WorkflowOrchestrator>,
    store: Arc<dyn JobStore>,
    /// Wakes the worker when a job is enqueued.
    notify: Notify,
    config: SchedulerConfig,
}

/// Priority job queue plus its worker.
#[derive(Clone)]
pub struct BatchScheduler {
    inner: Arc<SchedulerInner>,
}

impl BatchScheduler {
    pub fn new(orchestrator: Arc<WorkflowOrchestrator>, config: SchedulerConfig) -> Self {
        Self::with_store(orchestrator, Arc::new(InMemoryJobStore::new()), config)
    }

    pub fn with_store(
        orchestrator: Arc<WorkflowOrchestrator>,
        store: Arc<dyn JobStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                orchestrator,
                store,
                notify: Notify::new(),
                config,
            }),
        }
    }

    /// Enqueue a pending job and return its id without waiting for it.
    pub fn add_job(&self, owner_id: impl Into<String>, prompts: Vec<String>, priority: Priority) -> JobId {
        let job = Job::new(owner_id, prompts, priority);
        let id = job.id;
        tracing::info!(job_id = %id, owner_id = %job.owner_id, prompts = job.prompts.len(), priority, "job enqueued");
        self.inner.store.enqueue(job);
        telemetry_queue_depth(&self.inner);
        self.inner.notify.notify_one();
        id
    }

    pub fn get_job(&self, id: &JobId) -> Result<JobView, SchedulerError> {
        self.inner
            .store
            .get(id)
            .map(|job| job.view())
            .ok_or(SchedulerError::JobNotFound(*id))
    }

    pub fn jobs_for_owner(&self, owner_id: &str) -> Vec<JobView> {
        self.inner
            .store
            .for_owner(owner_id)
            .iter()
            .map(Job::view)
            .collect()
    }

    pub fn stats(&self) -> QueueStats {
        self.inner.store.stats()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Start the worker loop. It runs until `shutdown` is cancelled.
    pub fn start(&self, shutdown: CancellationToken) -> SchedulerHandle {
        let join = worker::spawn_worker(Arc::clone(&self.inner), shutdown.clone());
        SchedulerHandle { shutdown, join }
    }
}

fn telemetry_queue_depth(inner: &SchedulerInner) {
    crate::telemetry::record_queue_depth(inner.store.stats().pending);
}

/// Handle to a running worker loop.
pub struct SchedulerHandle {
    shutdown: CancellationToken,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the worker and wait for it to exit. An in-flight job is
    /// finished first; jobs still pending stay queued.
    pub async fn shutdown(self, timeout: Duration) -> Result<(), SchedulerError> {
        self.shutdown.cancel();
        match tokio::time::timeout(timeout, self.join).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SchedulerError::WorkerPanicked(e.to_string())),
            Err(_) => Err(SchedulerError::ShutdownTimeout(timeout)),
        }
    }
}
