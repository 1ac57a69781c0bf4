//! Batch job records and read-only views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::priority::Priority;
use crate::workflow::GenerationOutcome;

pub type JobId = Uuid;

/// `Pending -> Processing -> Completed`. No job-level failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        *self == Self::Completed
    }
}

/// Result slot of one prompt in a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptResult {
    Outcome(GenerationOutcome),
    Error { message: String },
}

impl PromptResult {
    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        match self {
            Self::Outcome(outcome) => Some(outcome),
            Self::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// A queued list of prompts for one owner.
///
/// `results` grows chunk by chunk in prompt order, so
/// `results.len() <= prompts.len()` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub owner_id: String,
    pub prompts: Vec<String>,
    pub priority: Priority,
    pub status: JobStatus,
    pub results: Vec<PromptResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(owner_id: impl Into<String>, prompts: Vec<String>, priority: Priority) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            prompts,
            priority,
            status: JobStatus::Pending,
            results: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view(&self) -> JobView {
        JobView {
            id: self.id,
            owner_id: self.owner_id.clone(),
            status: self.status,
            priority: self.priority,
            prompt_count: self.prompts.len(),
            completed_count: self.results.len(),
            results: self.status.is_terminal().then(|| self.results.clone()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Snapshot exposed to callers. `results` is present only once completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    pub id: JobId,
    pub owner_id: String,
    pub status: JobStatus,
    pub priority: Priority,
    pub prompt_count: usize,
    pub completed_count: usize,
    pub results: Option<Vec<PromptResult>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
