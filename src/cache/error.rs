use thiserror::Error;

/// Errors from a primary cache store. Never surfaced past [`super::CacheLayer`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache payload serialization failed: {0}")]
    Serialization(String),
}
