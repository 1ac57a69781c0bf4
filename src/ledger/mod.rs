//! Credit ledger for Forge CORE.
//!
//! Owns per-owner balances and the append-only transaction log. Every
//! balance change is committed together with the transaction that caused it.

mod account;
mod error;
mod ledger;
mod store;

pub use account::{ActionKind, CreditAccount, CreditTransaction, Credits, PlanTier};
pub use error::LedgerError;
pub use ledger::{CreditLedger, CreditLedgerConfig, CreditReservation};
pub use store::{InMemoryLedgerStore, LedgerStore};
