use thiserror::Error;

use crate::generation::GenerationError;
use crate::ledger::LedgerError;
use crate::store::StoreError;

/// Hard pipeline failures. Soft outcomes (insufficient credits, absorbed
/// polish failures) are returned as [`super::GenerationOutcome`] instead.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Everything except a missing account surfaces as an opaque internal failure.
    pub fn is_internal(&self) -> bool {
        !matches!(self, Self::Ledger(LedgerError::AccountNotFound(_)))
    }
}
