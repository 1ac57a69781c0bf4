//! Shared test fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use forge_core::ledger::{
    CreditAccount, CreditTransaction, InMemoryLedgerStore, LedgerError, LedgerStore,
};

/// Ledger store that sleeps before every read and write. Interleaves
/// concurrent read-compute-commit sequences that skip the owner lock.
pub struct SlowLedgerStore {
    inner: Arc<InMemoryLedgerStore>,
    delay: Duration,
}

impl SlowLedgerStore {
    pub fn new(inner: Arc<InMemoryLedgerStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl LedgerStore for SlowLedgerStore {
    async fn load_account(&self, owner_id: &str) -> Result<Option<CreditAccount>, LedgerError> {
        tokio::time::sleep(self.delay).await;
        self.inner.load_account(owner_id).await
    }

    async fn commit(
        &self,
        account: CreditAccount,
        transaction: CreditTransaction,
    ) -> Result<(), LedgerError> {
        tokio::time::sleep(self.delay).await;
        self.inner.commit(account, transaction).await
    }

    async fn transactions(&self, owner_id: &str) -> Result<Vec<CreditTransaction>, LedgerError> {
        self.inner.transactions(owner_id).await
    }
}
