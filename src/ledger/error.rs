//! Ledger error types.

use thiserror::Error;

/// Errors raised by the credit ledger and its storage.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Credit account not found: {0}")]
    AccountNotFound(String),

    #[error("Credit account already exists: {0}")]
    AccountExists(String),

    #[error("Balance overflow for account {0}")]
    BalanceOverflow(String),

    #[error("Ledger storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns true if the owner has no account.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AccountNotFound(_))
    }
}
