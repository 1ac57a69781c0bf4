//! Credit ledger tests: gate, trial window, debits and concurrency.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::SlowLedgerStore;
use forge_core::ledger::{
    ActionKind, CreditAccount, CreditLedger, CreditLedgerConfig, InMemoryLedgerStore, LedgerError,
    PlanTier,
};

fn ledger() -> (Arc<CreditLedger>, Arc<InMemoryLedgerStore>) {
    let store = Arc::new(InMemoryLedgerStore::new());
    let ledger = Arc::new(CreditLedger::new(store.clone(), CreditLedgerConfig::default()));
    (ledger, store)
}

fn free_account_started(owner: &str, days_ago: i64) -> CreditAccount {
    let mut account = CreditAccount::new(owner, PlanTier::Free);
    account.trial_start = Some(Utc::now() - Duration::days(days_ago));
    account
}

// =============================================================================
// Gate
// =============================================================================

#[tokio::test]
async fn free_plan_inside_trial_bypasses_balance() {
    let (ledger, _) = ledger();
    ledger.open_account(free_account_started("u1", 3), 0).await.unwrap();

    assert!(ledger.has_sufficient_credits("u1", 1).await.unwrap());
}

#[tokio::test]
async fn free_plan_after_trial_uses_balance() {
    let (ledger, _) = ledger();
    ledger.open_account(free_account_started("u1", 8), 0).await.unwrap();

    assert!(!ledger.has_sufficient_credits("u1", 1).await.unwrap());
}

#[tokio::test]
async fn paid_plan_compares_balance_inclusively() {
    let (ledger, _) = ledger();
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Pro), 2)
        .await
        .unwrap();

    assert!(ledger.has_sufficient_credits("u1", 2).await.unwrap());
    assert!(!ledger.has_sufficient_credits("u1", 3).await.unwrap());
}

#[tokio::test]
async fn missing_account_is_not_found() {
    let (ledger, _) = ledger();
    let err = ledger.has_sufficient_credits("ghost", 1).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        ledger.deduct_for_generation("ghost", 1, None).await,
        Err(LedgerError::AccountNotFound(_))
    ));
}

// =============================================================================
// Transactions
// =============================================================================

#[tokio::test]
async fn sequential_deductions_reduce_balance_and_log_each() {
    let (ledger, _) = ledger();
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Basic), 10)
        .await
        .unwrap();

    for i in 0..4 {
        let account = ledger
            .deduct_for_generation("u1", 1, Some(&format!("rec-{i}")))
            .await
            .unwrap();
        assert_eq!(account.balance, 10 - (i + 1));
    }

    let txs = ledger.transactions_for_owner("u1").await.unwrap();
    let generations: Vec<_> = txs
        .iter()
        .filter(|t| t.action == ActionKind::Generation)
        .collect();
    assert_eq!(generations.len(), 4);
    assert!(generations.iter().all(|t| t.amount == -1));
    // Newest first.
    assert_eq!(generations[0].artifact_ref.as_deref(), Some("rec-3"));
}

#[tokio::test]
async fn trial_debits_can_go_negative() {
    let (ledger, _) = ledger();
    ledger.open_account(free_account_started("u1", 1), 0).await.unwrap();

    let account = ledger.deduct_for_generation("u1", 1, None).await.unwrap();
    assert_eq!(account.balance, -1);
    assert!(ledger.has_sufficient_credits("u1", 1).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deductions_lose_no_updates() {
    let inner = Arc::new(InMemoryLedgerStore::new());
    let ledger = Arc::new(CreditLedger::new(
        Arc::new(SlowLedgerStore::new(inner.clone(), std::time::Duration::from_millis(2))),
        CreditLedgerConfig::default(),
    ));
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Pro), 100)
        .await
        .unwrap();

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.deduct_for_generation("u1", 1, None).await })
        })
        .collect();
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(ledger.balance("u1").await.unwrap(), 60);
    // 40 debits plus the opening subscription entry.
    assert_eq!(inner.transaction_count(), 41);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_exceed_balance() {
    let ledger = Arc::new(CreditLedger::new(
        Arc::new(SlowLedgerStore::new(
            Arc::new(InMemoryLedgerStore::new()),
            std::time::Duration::from_millis(2),
        )),
        CreditLedgerConfig::default(),
    ));
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Pro), 3)
        .await
        .unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                match ledger.reserve("u1", 1).await.unwrap() {
                    Some(reservation) => {
                        ledger.settle(reservation, None).await.unwrap();
                        true
                    }
                    None => false,
                }
            })
        })
        .collect();
    let mut granted = 0;
    for h in handles {
        if h.await.unwrap() {
            granted += 1;
        }
    }

    assert_eq!(granted, 3);
    assert_eq!(ledger.balance("u1").await.unwrap(), 0);
}

#[tokio::test]
async fn dropped_reservation_frees_the_hold() {
    let (ledger, _) = ledger();
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Basic), 1)
        .await
        .unwrap();

    let held = ledger.reserve("u1", 1).await.unwrap().unwrap();
    assert!(ledger.reserve("u1", 1).await.unwrap().is_none());
    drop(held);

    let again = ledger.reserve("u1", 1).await.unwrap();
    assert!(again.is_some());
    assert_eq!(ledger.balance("u1").await.unwrap(), 1);
}

#[tokio::test]
async fn trial_reservations_bypass_the_balance() {
    let (ledger, _) = ledger();
    ledger.open_account(free_account_started("u1", 2), 0).await.unwrap();

    let first = ledger.reserve("u1", 1).await.unwrap().unwrap();
    let second = ledger.reserve("u1", 1).await.unwrap().unwrap();
    ledger.settle(first, None).await.unwrap();
    let account = ledger.settle(second, None).await.unwrap();
    assert_eq!(account.balance, -2);
}

#[tokio::test]
async fn purchase_and_refund_credit_the_account() {
    let (ledger, _) = ledger();
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Basic), 0)
        .await
        .unwrap();

    ledger
        .add_from_purchase("u1", 25, serde_json::json!({ "order": "o-1" }))
        .await
        .unwrap();
    let account = ledger.add_refund("u1", 1, Some("rec-9")).await.unwrap();
    assert_eq!(account.balance, 26);

    let txs = ledger.transactions_for_owner("u1").await.unwrap();
    assert_eq!(txs[0].action, ActionKind::Refund);
    assert_eq!(txs[1].action, ActionKind::Purchase);
    assert_eq!(txs[1].metadata["order"], "o-1");
}

#[tokio::test]
async fn opening_an_existing_account_fails() {
    let (ledger, _) = ledger();
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Basic), 5)
        .await
        .unwrap();

    let err = ledger
        .open_account(CreditAccount::new("u1", PlanTier::Pro), 50)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountExists(_)));
    assert_eq!(ledger.balance("u1").await.unwrap(), 5);
}

#[tokio::test]
async fn opening_a_free_account_logs_a_trial_entry() {
    let (ledger, _) = ledger();
    ledger
        .open_account(CreditAccount::new("u1", PlanTier::Free), 3)
        .await
        .unwrap();

    let txs = ledger.transactions_for_owner("u1").await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].action, ActionKind::Trial);
    assert_eq!(txs[0].amount, 3);
}
