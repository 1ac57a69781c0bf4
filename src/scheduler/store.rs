//! Job queue storage.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::job::{Job, JobId, JobStatus};
use super::priority::PriorityQueue;

/// Job counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
}

/// Backing store for the batch queue.
///
/// The in-memory implementation loses jobs on restart; a durable store can
/// replace it behind this trait.
pub trait JobStore: Send + Sync {
    fn enqueue(&self, job: Job);

    /// Pop the highest-priority pending job, mark it processing, return it.
    fn claim_next(&self) -> Option<Job>;

    /// Overwrite the stored copy of a job.
    fn update(&self, job: &Job);

    fn get(&self, id: &JobId) -> Option<Job>;

    /// Jobs for one owner, oldest first.
    fn for_owner(&self, owner_id: &str) -> Vec<Job>;

    /// Drop terminal jobs last updated before `cutoff`. Returns the count removed.
    fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> usize;

    fn stats(&self) -> QueueStats;
}

#[derive(Default)]
struct JobTable {
    jobs: HashMap<JobId, Job>,
    pending: PriorityQueue<JobId>,
}

/// Process-local job store.
#[derive(Default)]
pub struct InMemoryJobStore {
    table: Mutex<JobTable>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn enqueue(&self, job: Job) {
        let mut table = self.table.lock();
        table.pending.push(job.id, job.priority);
        table.jobs.insert(job.id, job);
    }

    fn claim_next(&self) -> Option<Job> {
        let mut table = self.table.lock();
        while let Some(id) = table.pending.pop() {
            let Some(job) = table.jobs.get_mut(&id) else { continue };
            if job.status != JobStatus::Pending {
                continue;
            }
            job.status = JobStatus::Processing;
            job.updated_at = Utc::now();
            return Some(job.clone());
        }
        None
    }

    fn update(&self, job: &Job) {
        let mut table = self.table.lock();
        if let Some(stored) = table.jobs.get_mut(&job.id) {
            *stored = job.clone();
        }
    }

    fn get(&self, id: &JobId) -> Option<Job> {
        self.table.lock().jobs.get(id).cloned()
    }

    fn for_owner(&self, owner_id: &str) -> Vec<Job> {
        let table = self.table.lock();
        let mut jobs: Vec<Job> = table
            .jobs
            .values()
            .filter(|j| j.owner_id == owner_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        jobs
    }

    fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut table = self.table.lock();
        let before = table.jobs.len();
        table
            .jobs
            .retain(|_, job| !(job.status.is_terminal() && job.updated_at < cutoff));
        before - table.jobs.len()
    }

    fn stats(&self) -> QueueStats {
        let table = self.table.lock();
        table.jobs.values().fold(QueueStats::default(), |mut stats, job| {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Completed => stats.completed += 1,
            }
            stats
        })
    }
}
