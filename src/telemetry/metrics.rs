//! Metric recording through the `metrics` facade.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

use crate::generation::GenerationStatus;

/// Register metric descriptions. Safe to call before or without a recorder.
pub fn init_metrics() {
    describe_counter!("forge_generation_total", "Backend generations by terminal status");
    describe_counter!("forge_cache_lookups_total", "Cache probes by result");
    describe_counter!("forge_cache_degraded_total", "Primary cache failures absorbed by the local fallback");
    describe_counter!("forge_credits_debited_total", "Credits debited for generation attempts");
    describe_counter!("forge_gate_rejections_total", "Requests rejected for insufficient credits");
    describe_counter!("forge_prompt_failures_total", "Batch prompts that ended in a captured error");
    describe_counter!("forge_jobs_evicted_total", "Terminal jobs removed by garbage collection");
    describe_gauge!("forge_queue_depth", "Pending jobs in the batch queue");
    describe_histogram!("forge_job_duration_ms", "Wall time of a batch job from dequeue to completion");
}

pub fn record_generation(status: GenerationStatus) {
    counter!("forge_generation_total", "status" => status.as_str()).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("forge_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_degraded(op: &'static str) {
    counter!("forge_cache_degraded_total", "op" => op).increment(1);
}

pub fn record_credits_debited(amount: i64) {
    if amount > 0 {
        counter!("forge_credits_debited_total").increment(amount as u64);
    }
}

pub fn record_gate_rejection() {
    counter!("forge_gate_rejections_total").increment(1);
}

pub fn record_prompt_failure() {
    counter!("forge_prompt_failures_total").increment(1);
}

pub fn record_jobs_evicted(count: usize) {
    if count > 0 {
        counter!("forge_jobs_evicted_total").increment(count as u64);
    }
}

pub fn record_queue_depth(depth: usize) {
    gauge!("forge_queue_depth").set(depth as f64);
}

pub fn record_job_completed(duration_ms: u64) {
    histogram!("forge_job_duration_ms").record(duration_ms as f64);
}
