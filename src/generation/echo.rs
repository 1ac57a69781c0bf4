//! Deterministic offline backend.

use async_trait::async_trait;
use serde_json::json;

use super::backend::{Artifact, GenerationBackend, GenerationError};

/// Builds artifacts directly from the prompt text. Used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct EchoBackend;

impl EchoBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GenerationBackend for EchoBackend {
    async fn generate_draft(&self, prompt: &str, owner_id: &str) -> Result<Artifact, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::Draft("empty prompt".into()));
        }
        let sections: Vec<_> = prompt
            .split(|c| c == '.' || c == '\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| json!({ "label": s }))
            .collect();
        Ok(json!({
            "title": prompt,
            "owner": owner_id,
            "sections": sections,
            "polished": false,
        }))
    }

    async fn refine(
        &self,
        draft: &Artifact,
        _prompt: &str,
        _owner_id: &str,
    ) -> Result<Artifact, GenerationError> {
        let mut artifact = draft.clone();
        match artifact.as_object_mut() {
            Some(obj) => {
                obj.insert("polished".into(), json!(true));
                Ok(artifact)
            }
            None => Err(GenerationError::Polish("draft is not an object".into())),
        }
    }
}
