//! Workflow orchestrator composing ledger, cache, backend and store.

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use super::error::WorkflowError;
use super::request::{GenerationOutcome, GenerationRequest, CACHE_HIT_MESSAGE};
use crate::cache::{generation_key, CacheLayer};
use crate::generation::{self, GenerationBackend, GenerationResult};
use crate::ledger::{CreditLedger, Credits};
use crate::store::{NewRecord, PersistentStore};
use crate::telemetry::{self, GenerationSpan, SpanExt};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Credits debited per generation attempt, cached or not.
    pub generation_cost: Credits,
    /// TTL for cache fills of successful results.
    pub cache_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            generation_cost: 1,
            cache_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

pub struct WorkflowOrchestrator {
    ledger: Arc<CreditLedger>,
    cache: Arc<CacheLayer>,
    backend: Arc<dyn GenerationBackend>,
    store: Arc<dyn PersistentStore>,
    config: OrchestratorConfig,
}

impl WorkflowOrchestrator {
    pub fn new(
        ledger: Arc<CreditLedger>,
        cache: Arc<CacheLayer>,
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn PersistentStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            ledger,
            cache,
            backend,
            store,
            config,
        }
    }

    pub fn ledger(&self) -> &Arc<CreditLedger> {
        &self.ledger
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one request through the pipeline.
    ///
    /// The gate reserves the attempt's cost, so concurrent requests for one
    /// owner cannot together spend more than the balance. A hard error
    /// before the debit releases the reservation.
    ///
    /// Returns `Ok` with a failed status for soft failures (insufficient
    /// credits, absorbed polish errors). Draft, ledger and store errors
    /// propagate as `Err`.
    pub async fn process_generation_request(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, WorkflowError> {
        let span = GenerationSpan::new(&request.owner_id, request.prompt.len());
        let result = self.run(request).instrument(span.clone()).await;
        span.record_result(&result);
        if let Ok(outcome) = &result {
            span.record("outcome", outcome.status.as_str());
        }
        result
    }

    async fn run(&self, request: GenerationRequest) -> Result<GenerationOutcome, WorkflowError> {
        let owner_id = request.owner_id.as_str();
        let cost = self.config.generation_cost;

        let Some(reservation) = self.ledger.reserve(owner_id, cost).await? else {
            let balance = self.ledger.balance(owner_id).await?;
            tracing::info!(owner_id, balance, required = cost, "generation rejected: insufficient credits");
            telemetry::record_gate_rejection();
            return Ok(GenerationOutcome::insufficient_credits(balance));
        };

        let cache_key = generation_key(owner_id, &request.prompt);
        if request.use_cache {
            if let Some(hit) = self.cache.get_json::<GenerationResult>(&cache_key).await {
                telemetry::record_cache_lookup(true);
                tracing::Span::current().record("cache_hit", true);
                let account = self.ledger.settle(reservation, None).await?;
                return Ok(GenerationOutcome {
                    artifact: Some(hit.artifact),
                    record_id: None,
                    status: hit.status,
                    message: Some(CACHE_HIT_MESSAGE.to_string()),
                    remaining_credits: account.balance,
                });
            }
            telemetry::record_cache_lookup(false);
        }
        tracing::Span::current().record("cache_hit", false);

        let result = generation::generate(self.backend.as_ref(), &request.prompt, owner_id).await?;
        telemetry::record_generation(result.status);

        let record = self
            .store
            .save_record(NewRecord {
                owner_id: owner_id.to_string(),
                prompt: request.prompt.clone(),
                artifact: Some(result.artifact.clone()),
                status: result.status,
                credits_used: cost,
                file_refs: request.file_refs.clone(),
            })
            .await?;

        let account = self.ledger.settle(reservation, Some(&record.id)).await?;

        if request.use_cache && result.status.is_success() {
            self.cache.set_json(&cache_key, &result, self.config.cache_ttl).await;
        }

        Ok(GenerationOutcome {
            artifact: Some(result.artifact),
            record_id: Some(record.id),
            status: result.status,
            message: result.message,
            remaining_credits: account.balance,
        })
    }
}
