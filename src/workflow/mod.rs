//! Single-request generation pipeline.
//!
//! credit gate -> cache probe -> draft/polish -> persist -> debit -> cache fill

mod error;
mod orchestrator;
mod request;

pub use error::WorkflowError;
pub use orchestrator::{OrchestratorConfig, WorkflowOrchestrator};
pub use request::{GenerationOutcome, GenerationRequest, CACHE_HIT_MESSAGE, INSUFFICIENT_CREDITS_MESSAGE};
