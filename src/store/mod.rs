//! Durable record of generation attempts.

mod memory;

pub use memory::InMemoryRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::{Artifact, GenerationStatus};
use crate::ledger::Credits;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record storage error: {0}")]
    Storage(String),
}

/// Attempt to be persisted. `artifact` is `None` when nothing was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub owner_id: String,
    pub prompt: String,
    pub artifact: Option<Artifact>,
    pub status: GenerationStatus,
    pub credits_used: Credits,
    pub file_refs: Vec<String>,
}

/// A persisted generation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    pub owner_id: String,
    pub prompt: String,
    pub artifact: Option<Artifact>,
    pub status: GenerationStatus,
    pub credits_used: Credits,
    pub file_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn save_record(&self, record: NewRecord) -> Result<GenerationRecord, StoreError>;

    /// All records for `owner_id`, newest first.
    async fn records_for_owner(&self, owner_id: &str) -> Result<Vec<GenerationRecord>, StoreError>;
}
