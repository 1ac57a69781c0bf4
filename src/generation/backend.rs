//! Backend trait and the two-stage pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque structured output of generation.
pub type Artifact = serde_json::Value;

/// Terminal status of one generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Completed
    }
}

/// Output of [`generate`]: always carries an artifact once a draft exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub artifact: Artifact,
    pub status: GenerationStatus,
    pub message: Option<String>,
}

/// Errors that can occur inside a generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Draft generation failed: {0}")]
    Draft(String),

    #[error("Polish failed: {0}")]
    Polish(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Two-stage generation service.
///
/// Implementations may fail either stage; [`polish`] absorbs refinement
/// failures so callers never lose a produced draft.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_draft(&self, prompt: &str, owner_id: &str) -> Result<Artifact, GenerationError>;

    async fn refine(
        &self,
        draft: &Artifact,
        prompt: &str,
        owner_id: &str,
    ) -> Result<Artifact, GenerationError>;
}

/// Refine a draft. On failure returns the unpolished draft with `Failed`.
pub async fn polish(
    backend: &dyn GenerationBackend,
    draft: Artifact,
    prompt: &str,
    owner_id: &str,
) -> GenerationResult {
    match backend.refine(&draft, prompt, owner_id).await {
        Ok(artifact) => GenerationResult {
            artifact,
            status: GenerationStatus::Completed,
            message: None,
        },
        Err(e) => {
            tracing::warn!(owner_id, error = %e, "polish failed, returning draft");
            GenerationResult {
                artifact: draft,
                status: GenerationStatus::Failed,
                message: Some(format!("Returned unpolished draft: {e}")),
            }
        }
    }
}

/// Draft then polish. Only a draft failure is an error.
pub async fn generate(
    backend: &dyn GenerationBackend,
    prompt: &str,
    owner_id: &str,
) -> Result<GenerationResult, GenerationError> {
    let draft = backend.generate_draft(prompt, owner_id).await?;
    Ok(polish(backend, draft, prompt, owner_id).await)
}
