//! Telemetry module for Forge CORE.
//!
//! Provides structured logging, request spans, and metrics via the
//! `metrics` facade. No exporter is installed here; hosts pick one.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    init_metrics, record_cache_degraded, record_cache_lookup, record_credits_debited,
    record_gate_rejection, record_generation, record_job_completed, record_jobs_evicted,
    record_prompt_failure, record_queue_depth,
};
pub use spans::{GenerationSpan, JobSpan, SpanExt};
