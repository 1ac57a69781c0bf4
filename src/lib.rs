//! Forge CORE
//!
//! Request-processing core for prompt-driven artifact generation: a credit
//! gate, a tiered result cache, a two-stage generation pipeline, and a
//! priority batch scheduler.
//!
//! # Components
//!
//! - [`ledger::CreditLedger`]: per-owner balances and an append-only transaction log
//! - [`cache::CacheLayer`]: primary store with an in-process fallback
//! - [`generation::GenerationBackend`]: external draft/polish service
//! - [`store::PersistentStore`]: durable record of each attempt
//! - [`workflow::WorkflowOrchestrator`]: the single-request pipeline
//! - [`scheduler::BatchScheduler`]: priority queue drained by one worker loop
//!
//! Services are composed once in [`Runtime::new`]; there is no global state.

pub mod cache;
pub mod cli;
pub mod config;
pub mod generation;
pub mod ledger;
pub mod scheduler;
pub mod store;
pub mod telemetry;
pub mod workflow;

use std::sync::Arc;

use cache::{CacheLayer, CacheStore, LocalCache};
use config::EnvConfig;
use generation::GenerationBackend;
use ledger::{CreditLedger, InMemoryLedgerStore, LedgerStore};
use scheduler::{BatchScheduler, InMemoryJobStore, JobStore};
use store::{InMemoryRecordStore, PersistentStore};
use workflow::WorkflowOrchestrator;

/// External collaborators injected at startup.
pub struct Collaborators {
    pub backend: Arc<dyn GenerationBackend>,
    pub records: Arc<dyn PersistentStore>,
    pub ledger_store: Arc<dyn LedgerStore>,
    pub jobs: Arc<dyn JobStore>,
    /// Shared primary cache. `None` runs on the local fallback only.
    pub primary_cache: Option<Arc<dyn CacheStore>>,
}

impl Collaborators {
    /// In-process stores around the given backend.
    pub fn in_memory(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            records: Arc::new(InMemoryRecordStore::new()),
            ledger_store: Arc::new(InMemoryLedgerStore::new()),
            jobs: Arc::new(InMemoryJobStore::new()),
            primary_cache: None,
        }
    }
}

/// The Forge CORE runtime instance.
pub struct Runtime {
    pub ledger: Arc<CreditLedger>,
    pub cache: Arc<CacheLayer>,
    pub records: Arc<dyn PersistentStore>,
    pub orchestrator: Arc<WorkflowOrchestrator>,
    pub scheduler: BatchScheduler,
}

impl Runtime {
    /// Compose all services from configuration and collaborators.
    pub fn new(config: &EnvConfig, collaborators: Collaborators) -> Self {
        let ledger = Arc::new(CreditLedger::new(
            collaborators.ledger_store,
            config.ledger.clone(),
        ));
        let cache = Arc::new(CacheLayer::new(
            collaborators.primary_cache,
            LocalCache::new(config.local_cache.clone()),
        ));
        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            Arc::clone(&ledger),
            Arc::clone(&cache),
            collaborators.backend,
            Arc::clone(&collaborators.records),
            config.orchestrator.clone(),
        ));
        let scheduler = BatchScheduler::with_store(
            Arc::clone(&orchestrator),
            collaborators.jobs,
            config.scheduler.clone(),
        );

        Self {
            ledger,
            cache,
            records: collaborators.records,
            orchestrator,
            scheduler,
        }
    }
}
