use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{GenerationRecord, NewRecord, PersistentStore, StoreError};

/// Process-local record store.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<GenerationRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl PersistentStore for InMemoryRecordStore {
    async fn save_record(&self, record: NewRecord) -> Result<GenerationRecord, StoreError> {
        let saved = GenerationRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: record.owner_id,
            prompt: record.prompt,
            artifact: record.artifact,
            status: record.status,
            credits_used: record.credits_used,
            file_refs: record.file_refs,
            created_at: Utc::now(),
        };
        self.records.write().push(saved.clone());
        Ok(saved)
    }

    async fn records_for_owner(&self, owner_id: &str) -> Result<Vec<GenerationRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
