//! Credit ledger service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::account::{ActionKind, CreditAccount, CreditTransaction, Credits, PlanTier};
use super::error::LedgerError;
use super::store::LedgerStore;

/// Configuration for the credit ledger.
#[derive(Debug, Clone)]
pub struct CreditLedgerConfig {
    /// Length of the free-plan trial window.
    pub trial_window: Duration,
}

impl Default for CreditLedgerConfig {
    fn default() -> Self {
        Self { trial_window: Duration::days(7) }
    }
}

/// Balance gatekeeper and transaction writer.
///
/// Balance mutations for the same owner are serialized on a per-owner
/// async lock, so concurrent deductions cannot lose updates. Lock entries
/// are dropped once no task holds or waits on them.
pub struct CreditLedger {
    store: Arc<dyn LedgerStore>,
    owner_locks: DashMap<String, Arc<Mutex<()>>>,
    /// Credits held by outstanding reservations, per owner.
    reserved: Arc<DashMap<String, Credits>>,
    config: CreditLedgerConfig,
}

/// Credits held against an owner's balance between the gate and the debit.
///
/// Settle it with [`CreditLedger::settle`]; dropping it unsettled releases
/// the hold without writing a transaction.
pub struct CreditReservation {
    owner_id: String,
    amount: Credits,
    reserved: Arc<DashMap<String, Credits>>,
}

impl CreditReservation {
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn amount(&self) -> Credits {
        self.amount
    }
}

impl Drop for CreditReservation {
    fn drop(&mut self) {
        if let Some(mut held) = self.reserved.get_mut(&self.owner_id) {
            *held -= self.amount;
        }
        self.reserved.remove_if(&self.owner_id, |_, held| *held <= 0);
    }
}

/// Held per-owner lock. Prunes the map entry on release when unused.
struct OwnerGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    owner_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.owner_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl CreditLedger {
    pub fn new(store: Arc<dyn LedgerStore>, config: CreditLedgerConfig) -> Self {
        Self {
            store,
            owner_locks: DashMap::new(),
            reserved: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Fetch an account, failing with `AccountNotFound` if absent.
    pub async fn get_account(&self, owner_id: &str) -> Result<CreditAccount, LedgerError> {
        self.store
            .load_account(owner_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(owner_id.to_string()))
    }

    pub async fn balance(&self, owner_id: &str) -> Result<Credits, LedgerError> {
        Ok(self.get_account(owner_id).await?.balance)
    }

    /// True while a free-plan owner is inside the trial window, otherwise
    /// `balance >= required`.
    pub async fn has_sufficient_credits(
        &self,
        owner_id: &str,
        required: Credits,
    ) -> Result<bool, LedgerError> {
        let account = self.get_account(owner_id).await?;
        if account.in_trial(Utc::now(), self.config.trial_window) {
            return Ok(true);
        }
        Ok(account.balance >= required)
    }

    /// Credit gate that holds `cost` until the attempt is settled.
    ///
    /// Passes while a free-plan owner is inside the trial window, otherwise
    /// when the balance minus outstanding reservations covers `cost`.
    /// Returns `None` when the gate rejects.
    pub async fn reserve(
        &self,
        owner_id: &str,
        cost: Credits,
    ) -> Result<Option<CreditReservation>, LedgerError> {
        let _guard = self.lock_owner(owner_id).await;
        let account = self.get_account(owner_id).await?;
        let held = self.reserved.get(owner_id).map(|r| *r.value()).unwrap_or(0);

        let in_trial = account.in_trial(Utc::now(), self.config.trial_window);
        if !in_trial && account.balance.saturating_sub(held) < cost {
            return Ok(None);
        }
        *self.reserved.entry(owner_id.to_string()).or_insert(0) += cost;
        Ok(Some(CreditReservation {
            owner_id: owner_id.to_string(),
            amount: cost,
            reserved: Arc::clone(&self.reserved),
        }))
    }

    /// Debit a reservation as a generation and release its hold in one step.
    pub async fn settle(
        &self,
        reservation: CreditReservation,
        artifact_ref: Option<&str>,
    ) -> Result<CreditAccount, LedgerError> {
        let _guard = self.lock_owner(&reservation.owner_id).await;
        let tx = generation_tx(&reservation.owner_id, reservation.amount, artifact_ref);
        let result = self.apply(tx).await;
        if result.is_ok() {
            crate::telemetry::record_credits_debited(reservation.amount);
        }
        drop(reservation);
        result
    }

    /// Create an account with an opening transaction.
    ///
    /// Free accounts open with a `trial` entry, paid plans with `subscription`.
    pub async fn open_account(
        &self,
        mut account: CreditAccount,
        initial_balance: Credits,
    ) -> Result<CreditAccount, LedgerError> {
        let _guard = self.lock_owner(&account.owner_id).await;

        if self.store.load_account(&account.owner_id).await?.is_some() {
            return Err(LedgerError::AccountExists(account.owner_id));
        }
        let action = match account.plan {
            PlanTier::Free => ActionKind::Trial,
            _ => ActionKind::Subscription,
        };
        let tx = CreditTransaction::new(account.owner_id.clone(), initial_balance, action);
        account.balance = initial_balance;
        account.updated_at = tx.created_at;
        self.store.commit(account.clone(), tx).await?;
        tracing::info!(owner_id = %account.owner_id, plan = ?account.plan, "credit account opened");
        Ok(account)
    }

    /// Apply a transaction and return the updated account.
    pub async fn record_transaction(
        &self,
        tx: CreditTransaction,
    ) -> Result<CreditAccount, LedgerError> {
        let _guard = self.lock_owner(&tx.owner_id).await;
        self.apply(tx).await
    }

    pub async fn deduct_for_generation(
        &self,
        owner_id: &str,
        cost: Credits,
        artifact_ref: Option<&str>,
    ) -> Result<CreditAccount, LedgerError> {
        let account = self
            .record_transaction(generation_tx(owner_id, cost, artifact_ref))
            .await?;
        crate::telemetry::record_credits_debited(cost);
        Ok(account)
    }

    pub async fn add_from_purchase(
        &self,
        owner_id: &str,
        amount: Credits,
        metadata: serde_json::Value,
    ) -> Result<CreditAccount, LedgerError> {
        let tx = CreditTransaction::new(owner_id, amount, ActionKind::Purchase).with_metadata(metadata);
        self.record_transaction(tx).await
    }

    pub async fn add_refund(
        &self,
        owner_id: &str,
        amount: Credits,
        artifact_ref: Option<&str>,
    ) -> Result<CreditAccount, LedgerError> {
        let mut tx = CreditTransaction::new(owner_id, amount, ActionKind::Refund);
        if let Some(r) = artifact_ref {
            tx = tx.with_artifact(r);
        }
        self.record_transaction(tx).await
    }

    /// Ledger history for one owner, newest first.
    pub async fn transactions_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<CreditTransaction>, LedgerError> {
        self.store.transactions(owner_id).await
    }

    /// Read-compute-commit. Callers hold the owner lock.
    async fn apply(&self, tx: CreditTransaction) -> Result<CreditAccount, LedgerError> {
        let mut account = self.get_account(&tx.owner_id).await?;
        account.balance = account
            .balance
            .checked_add(tx.amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(tx.owner_id.clone()))?;
        account.updated_at = tx.created_at;

        tracing::debug!(
            owner_id = %tx.owner_id,
            amount = tx.amount,
            action = tx.action.as_str(),
            balance = account.balance,
            "ledger transaction recorded"
        );
        self.store.commit(account.clone(), tx).await?;
        Ok(account)
    }

    async fn lock_owner(&self, owner_id: &str) -> OwnerGuard<'_> {
        let lock = self
            .owner_locks
            .entry(owner_id.to_string())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;
        OwnerGuard {
            locks: &self.owner_locks,
            owner_id: owner_id.to_string(),
            guard: Some(guard),
        }
    }
}

fn generation_tx(owner_id: &str, cost: Credits, artifact_ref: Option<&str>) -> CreditTransaction {
    let tx = CreditTransaction::new(owner_id, -cost, ActionKind::Generation);
    match artifact_ref {
        Some(r) => tx.with_artifact(r),
        None => tx,
    }
}
