//! Error types for wagerbook-core

use crate::env::{MarketId, Timestamp};
use thiserror::Error;

/// Result type alias for wagerbook operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Error types for market operations.
///
/// Every failure is a precondition-style rejection: the operation that
/// returned the error left the book's state exactly as it found it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Caller lacks the operator capability
    #[error("caller is not the market operator")]
    Unauthorized,

    /// Market deadline is not strictly in the future
    #[error("deadline {end_time} is not after the current time {now}")]
    InvalidDeadline { end_time: Timestamp, now: Timestamp },

    /// Unknown market id
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    /// Staking attempted after the market deadline
    #[error("market is closed for staking")]
    MarketClosed,

    /// Resolution attempted before the market deadline
    #[error("market is still open")]
    MarketStillOpen,

    /// Staking attempted on a resolved market
    #[error("market has been resolved")]
    MarketResolved,

    /// Resolution attempted on an already-resolved market
    #[error("market was already resolved")]
    AlreadyResolved,

    /// Stake with a zero value
    #[error("stake value must be greater than zero")]
    ZeroStake,

    /// Caller has no stake in the market
    #[error("caller holds no position in this market")]
    NoPosition,

    /// Winnings were already paid out for this position
    #[error("winnings were already claimed")]
    AlreadyClaimed,

    /// Position's prediction does not match the resolved outcome
    #[error("position did not predict the resolved outcome")]
    NotAWinner,

    /// Read or claim that requires a resolved market
    #[error("market is not resolved yet")]
    NotResolved,

    /// No position matched the resolved outcome, so there is nothing to split
    #[error("no position matched the resolved outcome")]
    NoWinners,

    /// Fee above the hard ceiling
    #[error("fee of {0} basis points exceeds the ceiling of 300")]
    FeeTooHigh(u16),

    /// Outbound value transfer was rejected by the treasury
    #[error("value transfer failed: {0}")]
    TransferFailed(String),

    /// Fee withdrawal with an empty fee ledger
    #[error("no fees accrued for withdrawal")]
    NoFeesAccrued,

    /// Generic error for other cases
    #[error("market error: {0}")]
    Other(String),
}

impl From<&str> for MarketError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

impl From<String> for MarketError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
