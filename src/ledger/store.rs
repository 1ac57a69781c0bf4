//! Ledger storage seam.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::account::{CreditAccount, CreditTransaction};
use super::error::LedgerError;

/// Durable backing for accounts and transactions.
///
/// `commit` must write the account snapshot and the transaction as one
/// unit: a reader may never observe one without the other.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load_account(&self, owner_id: &str) -> Result<Option<CreditAccount>, LedgerError>;

    async fn commit(
        &self,
        account: CreditAccount,
        transaction: CreditTransaction,
    ) -> Result<(), LedgerError>;

    /// Transactions for one owner, newest first.
    async fn transactions(&self, owner_id: &str) -> Result<Vec<CreditTransaction>, LedgerError>;
}

#[derive(Default)]
struct LedgerTables {
    accounts: HashMap<String, CreditAccount>,
    transactions: Vec<CreditTransaction>,
}

/// Process-local ledger store. Both tables sit behind a single lock.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    tables: RwLock<LedgerTables>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of transactions across all owners.
    pub fn transaction_count(&self) -> usize {
        self.tables.read().transactions.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load_account(&self, owner_id: &str) -> Result<Option<CreditAccount>, LedgerError> {
        Ok(self.tables.read().accounts.get(owner_id).cloned())
    }

    async fn commit(
        &self,
        account: CreditAccount,
        transaction: CreditTransaction,
    ) -> Result<(), LedgerError> {
        if account.owner_id != transaction.owner_id {
            return Err(LedgerError::Storage(format!(
                "transaction owner {} does not match account {}",
                transaction.owner_id, account.owner_id
            )));
        }
        let mut tables = self.tables.write();
        tables.accounts.insert(account.owner_id.clone(), account);
        tables.transactions.push(transaction);
        Ok(())
    }

    async fn transactions(&self, owner_id: &str) -> Result<Vec<CreditTransaction>, LedgerError> {
        let tables = self.tables.read();
        Ok(tables
            .transactions
            .iter()
            .rev()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
