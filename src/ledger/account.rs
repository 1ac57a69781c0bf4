//! Account and transaction records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credit units. Deductions are negative amounts.
pub type Credits = i64;

/// Subscription plan of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl Default for PlanTier {
    fn default() -> Self {
        Self::Free
    }
}

/// Current balance snapshot of one owner.
///
/// Only the ledger writes these, always alongside a [`CreditTransaction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAccount {
    pub owner_id: String,
    pub balance: Credits,
    pub plan: PlanTier,
    pub trial_start: Option<DateTime<Utc>>,
    pub subscription_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CreditAccount {
    pub fn new(owner_id: impl Into<String>, plan: PlanTier) -> Self {
        let now = Utc::now();
        Self {
            owner_id: owner_id.into(),
            balance: 0,
            plan,
            trial_start: (plan == PlanTier::Free).then_some(now),
            subscription_id: None,
            updated_at: now,
        }
    }

    /// Free-plan accounts bypass the balance check for `window` after trial start.
    pub fn in_trial(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if self.plan != PlanTier::Free {
            return false;
        }
        match self.trial_start {
            Some(start) => now >= start && now - start < window,
            None => false,
        }
    }
}

/// Reason a transaction was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Generation,
    Purchase,
    Refund,
    Subscription,
    Trial,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Purchase => "purchase",
            Self::Refund => "refund",
            Self::Subscription => "subscription",
            Self::Trial => "trial",
        }
    }
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub owner_id: String,
    /// Signed change applied to the balance.
    pub amount: Credits,
    pub action: ActionKind,
    pub artifact_ref: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    pub fn new(owner_id: impl Into<String>, amount: Credits, action: ActionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            amount,
            action,
            artifact_ref: None,
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    pub fn with_artifact(mut self, artifact_ref: impl Into<String>) -> Self {
        self.artifact_ref = Some(artifact_ref.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
