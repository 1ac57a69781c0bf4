//! Pipeline input and output types.

use serde::{Deserialize, Serialize};

use crate::generation::{Artifact, GenerationStatus};
use crate::ledger::Credits;

pub const INSUFFICIENT_CREDITS_MESSAGE: &str = "Insufficient credits";
pub const CACHE_HIT_MESSAGE: &str = "Retrieved from cache";

/// One prompt to generate for one owner. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub owner_id: String,
    pub file_refs: Vec<String>,
    pub use_cache: bool,
}

impl GenerationRequest {
    pub fn new(owner_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            owner_id: owner_id.into(),
            file_refs: Vec::new(),
            use_cache: true,
        }
    }

    pub fn with_files(mut self, file_refs: Vec<String>) -> Self {
        self.file_refs = file_refs;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub artifact: Option<Artifact>,
    pub record_id: Option<String>,
    pub status: GenerationStatus,
    pub message: Option<String>,
    pub remaining_credits: Credits,
}

impl GenerationOutcome {
    pub(crate) fn insufficient_credits(balance: Credits) -> Self {
        Self {
            artifact: None,
            record_id: None,
            status: GenerationStatus::Failed,
            message: Some(INSUFFICIENT_CREDITS_MESSAGE.to_string()),
            remaining_credits: balance,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        self.message.as_deref() == Some(CACHE_HIT_MESSAGE)
    }
}
