//! # Environment Boundary
//!
//! The ledger core is deliberately closed over three things it cannot
//! provide for itself: the identity of the caller, a source of time, and a
//! way to move value out to an account. Callers are plain [`AccountId`]
//! strings passed into every operation; time and value transfer are the
//! [`Clock`] and [`Treasury`] traits implemented by the embedder.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sequential market identifier, starting at 1
pub type MarketId = u64;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Transferable value in indivisible units
pub type Value = u64;

/// Participant identity as seen by the ledger
pub type AccountId = String;

/// Source of "current time" for deadline checks.
///
/// Sampled exactly once per operation; an operation never re-reads the
/// clock mid-flight.
pub trait Clock {
    /// Current time as a Unix timestamp in seconds
    fn now(&self) -> Timestamp;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

/// Outbound value transfer performed by the embedder.
///
/// A credit either fully succeeds or fails without effect; the book rolls
/// its own state back whenever a credit fails.
pub trait Treasury {
    /// Transfer `amount` units to `to`
    fn credit(&mut self, to: &str, amount: Value) -> Result<()>;
}

/// In-memory treasury that accumulates credits per account.
///
/// Suitable for embedding the ledger in a single process; credits never
/// fail. The balances map is serialized together with the book state by
/// embedders that persist snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashTreasury {
    balances: BTreeMap<AccountId, Value>,
}

impl CashTreasury {
    /// Create an empty treasury
    pub fn new() -> Self {
        Self::default()
    }

    /// Total credited to `account` so far
    pub fn balance_of(&self, account: &str) -> Value {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// All accounts with their credited totals, in account order
    pub fn balances(&self) -> impl Iterator<Item = (&str, Value)> {
        self.balances.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Treasury for CashTreasury {
    fn credit(&mut self, to: &str, amount: Value) -> Result<()> {
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }
}
