//! Notification events emitted by the book for external observers and
//! indexers. Events are queued inside the book and drained by the embedder;
//! they are a side output, never an input.

use crate::env::{AccountId, MarketId, Timestamp, Value};
use serde::{Deserialize, Serialize};

/// One notification per state-mutating operation that succeeded
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A market was created
    Created {
        market_id: MarketId,
        title: String,
        end_time: Timestamp,
    },

    /// A stake was placed or topped up
    StakePlaced {
        market_id: MarketId,
        account: AccountId,
        prediction: u64,
        value: Value,
        total_staked: Value,
    },

    /// A market was resolved with its true outcome
    Resolved { market_id: MarketId, outcome: u64 },

    /// A winner was paid out
    WinningsClaimed {
        market_id: MarketId,
        account: AccountId,
        winnings: Value,
    },

    /// The global fee changed
    FeeUpdated { fee_bps: u16 },

    /// Accrued fees were paid to the operator
    FeesWithdrawn { to: AccountId, amount: Value },
}
