//! Span utilities and extension traits for Forge CORE tracing.

use tracing::{info_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Span for one pass through the generation pipeline.
pub struct GenerationSpan;

impl GenerationSpan {
    /// Fields `status`, `outcome`, `cache_hit` and `error.message` are
    /// filled in after the pipeline returns.
    pub fn new(owner_id: &str, prompt_len: usize) -> Span {
        info_span!(
            "generation_request",
            owner_id = %owner_id,
            prompt_len,
            status = tracing::field::Empty,
            outcome = tracing::field::Empty,
            cache_hit = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }
}

/// Span for one batch job processed by the scheduler.
pub struct JobSpan;

impl JobSpan {
    pub fn new(job_id: &str, owner_id: &str, prompt_count: usize, priority: i32) -> Span {
        info_span!(
            "batch_job",
            job_id = %job_id,
            owner_id = %owner_id,
            prompt_count,
            priority,
            failed_prompts = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    }
}
