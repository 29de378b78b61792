//! # Wagerbook Core
//!
//! Core ledger for binary-outcome prediction markets: an operator opens a
//! market around a future metric, participants stake value on a predicted
//! outcome before the deadline, the operator resolves the market with the
//! true outcome, and winners split the losers' stakes minus a platform fee.
//!
//! The ledger is self-contained and synchronous. It consumes its
//! environment through three seams:
//! - caller identity as an [`AccountId`] passed into every operation,
//! - time through the [`Clock`] trait, sampled once per operation,
//! - outbound payouts through the [`Treasury`] trait.
//!
//! Every mutating operation is all-or-nothing: it either commits fully or
//! fails with a typed [`MarketError`] leaving state untouched, including
//! the outbound transfer in a claim.
//!
//! ## Examples
//!
//! ```rust
//! use wagerbook_core::{CashTreasury, MarketBook, SystemClock};
//!
//! let mut book = MarketBook::new("operator", SystemClock, CashTreasury::new());
//! let far_future = book.now() + 86_400;
//!
//! let id = book.create_market(
//!     "operator",
//!     "BTC closing price",
//!     "Predict the year-end closing price in whole dollars",
//!     far_future,
//! )?;
//! book.stake("alice", id, 100_000, 500)?;
//! # Ok::<(), wagerbook_core::MarketError>(())
//! ```

pub mod book;
pub mod env;
pub mod error;
pub mod event;
pub mod market;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

pub use book::{BookState, MarketBook};
pub use env::{
    AccountId, CashTreasury, Clock, MarketId, SystemClock, Timestamp, Treasury, Value,
};
pub use error::{MarketError, Result};
pub use event::MarketEvent;
pub use market::{ClaimQuote, Market, Position};
pub use utils::*;

/// Hard ceiling on the platform fee (300 basis points = 3%)
pub const MAX_FEE_BPS: u16 = 300;

/// Basis-point denominator (1 bp = 0.01%)
pub const BPS_DENOMINATOR: u64 = 10_000;
