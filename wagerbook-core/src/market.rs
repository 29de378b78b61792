//! # Market and Position Model
//!
//! This module implements a single binary-outcome prediction market: the
//! per-market state machine (open → resolved) and the per-participant
//! position ledger inside it.
//!
//! Participants stake value on a predicted numeric outcome before the
//! deadline. Once resolved, positions whose prediction equals the outcome
//! split the whole pool, minus the platform fee, proportionally to their
//! staked amount.

use crate::env::{AccountId, Timestamp, Value};
use crate::error::{MarketError, Result};
use crate::BPS_DENOMINATOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A binary-outcome prediction market.
///
/// Created in the open state, accepting stakes until `end_time`, then
/// resolved exactly once with the true outcome value. Markets are never
/// deleted; a resolved market is permanent history.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Market {
    /// Market title, immutable after creation
    pub title: String,

    /// Longer market description, immutable after creation
    pub description: String,

    /// Deadline: staking forbidden and resolution permitted once
    /// `now >= end_time`
    pub end_time: Timestamp,

    /// Sum of all value ever staked into this market
    pub total_staked: Value,

    /// Whether the market has been resolved
    pub resolved: bool,

    /// The true outcome value, set exactly once at resolution
    pub outcome: Option<u64>,

    /// One position per participant, keyed by account
    pub positions: BTreeMap<AccountId, Position>,
}

/// One participant's stake within a market
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Predicted outcome value; always reflects the most recent stake call
    pub prediction: u64,

    /// Cumulative value staked across all of this participant's stake calls
    pub amount: Value,

    /// Whether winnings were already paid out for this position
    pub claimed: bool,
}

/// Amounts computed for a single claim, before any state is touched.
///
/// `gross` is the claimant's full pro-rata share of the pool; `winnings`
/// is the same share after the fee deduction. The difference accrues to
/// the fee ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimQuote {
    /// Fee-deducted amount owed to the claimant
    pub winnings: Value,

    /// Pre-fee pool share leaving the market for this claim
    pub gross: Value,
}

impl Market {
    /// Create a new open market. Deadline validation against the current
    /// time is the registry's job; this constructor only records state.
    pub fn new(title: String, description: String, end_time: Timestamp) -> Self {
        Self {
            title,
            description,
            end_time,
            total_staked: 0,
            resolved: false,
            outcome: None,
            positions: BTreeMap::new(),
        }
    }

    /// Stake `value` on `prediction` for `account`.
    ///
    /// A first stake creates the position. A repeat stake by the same
    /// account ADDS to the staked amount but OVERWRITES the prediction:
    /// the predicted value always tracks the latest call while the amount
    /// accumulates. This asymmetric merge is required behavior.
    pub fn stake(
        &mut self,
        account: &str,
        prediction: u64,
        value: Value,
        now: Timestamp,
    ) -> Result<()> {
        if value == 0 {
            return Err(MarketError::ZeroStake);
        }
        if now >= self.end_time {
            return Err(MarketError::MarketClosed);
        }
        if self.resolved {
            return Err(MarketError::MarketResolved);
        }

        match self.positions.get_mut(account) {
            Some(position) => {
                position.amount += value;
                position.prediction = prediction;
            }
            None => {
                self.positions.insert(
                    account.to_string(),
                    Position {
                        prediction,
                        amount: value,
                        claimed: false,
                    },
                );
            }
        }
        self.total_staked += value;

        Ok(())
    }

    /// Resolve the market with the true outcome value.
    ///
    /// Only valid once the deadline has passed, and only once. There is no
    /// re-resolution or correction path: a mis-resolved market stays
    /// mis-resolved and a replacement market must be opened instead.
    pub fn resolve(&mut self, outcome: u64, now: Timestamp) -> Result<()> {
        if now < self.end_time {
            return Err(MarketError::MarketStillOpen);
        }
        if self.resolved {
            return Err(MarketError::AlreadyResolved);
        }

        self.resolved = true;
        self.outcome = Some(outcome);

        Ok(())
    }

    /// Total value staked on positions whose prediction matches the
    /// resolved outcome. Fails with `NotResolved` before resolution.
    pub fn winner_pool(&self) -> Result<Value> {
        let outcome = self.outcome.filter(|_| self.resolved).ok_or(MarketError::NotResolved)?;
        Ok(self.prediction_pool(outcome))
    }

    /// Total value staked on a given predicted value, resolved or not
    pub fn prediction_pool(&self, prediction: u64) -> Value {
        self.positions
            .values()
            .filter(|p| p.prediction == prediction)
            .map(|p| p.amount)
            .sum()
    }

    /// Payout ratio currently implied for a predicted value.
    ///
    /// `total_staked / staked-on-prediction`; returns 1.0 when nothing has
    /// been staked on that value yet.
    pub fn odds(&self, prediction: u64) -> f64 {
        let on_prediction = self.prediction_pool(prediction) as f64;
        if on_prediction == 0.0 {
            return 1.0;
        }
        self.total_staked as f64 / on_prediction
    }

    /// One participant's position, if any
    pub fn position(&self, account: &str) -> Option<&Position> {
        self.positions.get(account)
    }

    /// Compute the payout owed to `account` at the given fee, without
    /// mutating anything.
    ///
    /// Integer arithmetic with floor division, in this exact order:
    /// fee off the whole pool first, then the claimant's proportional
    /// share of what remains among the winning stakes. 128-bit
    /// intermediates keep the products from overflowing.
    pub fn claim_quote(&self, account: &str, fee_bps: u16) -> Result<ClaimQuote> {
        if !self.resolved {
            return Err(MarketError::NotResolved);
        }
        let outcome = self.outcome.ok_or(MarketError::NotResolved)?;

        let position = match self.positions.get(account) {
            Some(p) if p.amount > 0 => p,
            _ => return Err(MarketError::NoPosition),
        };
        if position.claimed {
            return Err(MarketError::AlreadyClaimed);
        }
        if position.prediction != outcome {
            return Err(MarketError::NotAWinner);
        }

        let winner_pool = self.prediction_pool(outcome);
        if winner_pool == 0 {
            // Unreachable once the claimant passed the winner check, but
            // the guard keeps the division below total.
            return Err(MarketError::NoWinners);
        }

        let total = self.total_staked as u128;
        let fee_amount = total * fee_bps as u128 / BPS_DENOMINATOR as u128;
        let winning_pool = total - fee_amount;

        let winnings = (position.amount as u128 * winning_pool / winner_pool as u128) as Value;
        let gross = (position.amount as u128 * total / winner_pool as u128) as Value;

        Ok(ClaimQuote { winnings, gross })
    }

    /// Check if the market is past its staking deadline
    pub fn is_past_deadline(&self, now: Timestamp) -> bool {
        now >= self.end_time
    }

    /// Human-readable market status summary
    pub fn status(&self, now: Timestamp) -> String {
        if self.resolved {
            match self.outcome {
                Some(outcome) => format!("Resolved - outcome {outcome}"),
                None => "Resolved - no outcome set".to_string(),
            }
        } else if self.is_past_deadline(now) {
            "Awaiting resolution".to_string()
        } else {
            "Open - accepting stakes".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::constants::{ALICE, BOB, CAROL, TEST_END_TIME};

    fn open_market() -> Market {
        Market::new(
            "BTC price at year end".to_string(),
            "Predict the closing price in whole dollars".to_string(),
            TEST_END_TIME,
        )
    }

    #[test]
    fn test_first_stake_creates_position() {
        let mut market = open_market();
        market.stake(ALICE, 42, 100, TEST_END_TIME - 10).unwrap();

        let position = market.position(ALICE).unwrap();
        assert_eq!(position.prediction, 42);
        assert_eq!(position.amount, 100);
        assert!(!position.claimed);
        assert_eq!(market.total_staked, 100);
    }

    #[test]
    fn test_repeat_stake_accumulates_amount_and_overwrites_prediction() {
        let mut market = open_market();
        market.stake(ALICE, 42, 100, TEST_END_TIME - 10).unwrap();
        market.stake(ALICE, 77, 50, TEST_END_TIME - 5).unwrap();

        let position = market.position(ALICE).unwrap();
        assert_eq!(position.amount, 150, "amounts accumulate");
        assert_eq!(position.prediction, 77, "prediction tracks the latest call");
        assert_eq!(market.total_staked, 150);
        assert_eq!(market.positions.len(), 1, "still a single position");
    }

    #[test]
    fn test_total_staked_matches_position_sum() {
        let mut market = open_market();
        market.stake(ALICE, 42, 100, TEST_END_TIME - 10).unwrap();
        market.stake(BOB, 43, 250, TEST_END_TIME - 9).unwrap();
        market.stake(ALICE, 44, 75, TEST_END_TIME - 8).unwrap();
        market.stake(CAROL, 42, 25, TEST_END_TIME - 7).unwrap();

        let sum: Value = market.positions.values().map(|p| p.amount).sum();
        assert_eq!(market.total_staked, sum);
        assert_eq!(market.total_staked, 450);
    }

    #[test]
    fn test_stake_rejects_zero_value() {
        let mut market = open_market();
        let err = market.stake(ALICE, 42, 0, TEST_END_TIME - 10).unwrap_err();
        assert_eq!(err, MarketError::ZeroStake);
        assert!(market.positions.is_empty());
    }

    #[test]
    fn test_stake_rejects_past_deadline() {
        let mut market = open_market();
        let err = market.stake(ALICE, 42, 100, TEST_END_TIME).unwrap_err();
        assert_eq!(err, MarketError::MarketClosed);
        assert_eq!(market.total_staked, 0);
    }

    #[test]
    fn test_resolve_before_deadline_fails() {
        let mut market = open_market();
        let err = market.resolve(42, TEST_END_TIME - 1).unwrap_err();
        assert_eq!(err, MarketError::MarketStillOpen);
        assert!(!market.resolved);
    }

    #[test]
    fn test_resolve_succeeds_exactly_once() {
        let mut market = open_market();
        market.resolve(42, TEST_END_TIME).unwrap();
        assert!(market.resolved);
        assert_eq!(market.outcome, Some(42));

        let err = market.resolve(43, TEST_END_TIME + 1).unwrap_err();
        assert_eq!(err, MarketError::AlreadyResolved);
        assert_eq!(market.outcome, Some(42), "outcome is irreversible");
    }

    #[test]
    fn test_winner_pool_requires_resolution() {
        let mut market = open_market();
        market.stake(ALICE, 42, 100, TEST_END_TIME - 10).unwrap();
        assert_eq!(market.winner_pool().unwrap_err(), MarketError::NotResolved);
    }

    // An earlier revision declared a winner pool accumulator and then
    // returned 0 unconditionally, which made every claim divide by zero.
    // This pins the corrected summation.
    #[test]
    fn test_winner_pool_sums_matching_positions() {
        let mut market = open_market();
        market.stake(ALICE, 42, 100, TEST_END_TIME - 10).unwrap();
        market.stake(BOB, 42, 300, TEST_END_TIME - 9).unwrap();
        market.stake(CAROL, 7, 600, TEST_END_TIME - 8).unwrap();
        market.resolve(42, TEST_END_TIME).unwrap();

        assert_eq!(market.winner_pool().unwrap(), 400);
    }

    #[test]
    fn test_prediction_pool_and_odds() {
        let mut market = open_market();
        market.stake(ALICE, 42, 250, TEST_END_TIME - 10).unwrap();
        market.stake(BOB, 7, 750, TEST_END_TIME - 9).unwrap();

        assert_eq!(market.prediction_pool(42), 250);
        assert_eq!(market.prediction_pool(7), 750);
        assert_eq!(market.prediction_pool(99), 0);

        assert_eq!(market.odds(42), 4.0);
        assert_eq!(market.odds(99), 1.0);
    }

    #[test]
    fn test_claim_quote_worked_example() {
        // total 1000, fee 150 bp, single winner staked 400:
        // fee = 15, winning pool = 985, winnings = 400 * 985 / 400 = 985
        let mut market = open_market();
        market.stake(ALICE, 42, 400, TEST_END_TIME - 10).unwrap();
        market.stake(BOB, 7, 600, TEST_END_TIME - 9).unwrap();
        market.resolve(42, TEST_END_TIME).unwrap();

        let quote = market.claim_quote(ALICE, 150).unwrap();
        assert_eq!(quote.winnings, 985);
        assert_eq!(quote.gross, 1000);
    }

    #[test]
    fn test_claim_quote_splits_proportionally() {
        let mut market = open_market();
        market.stake(ALICE, 42, 100, TEST_END_TIME - 10).unwrap();
        market.stake(BOB, 42, 300, TEST_END_TIME - 9).unwrap();
        market.stake(CAROL, 7, 600, TEST_END_TIME - 8).unwrap();
        market.resolve(42, TEST_END_TIME).unwrap();

        // fee 0: winners split the full 1000 pool 1:3
        let alice = market.claim_quote(ALICE, 0).unwrap();
        let bob = market.claim_quote(BOB, 0).unwrap();
        assert_eq!(alice.winnings, 250);
        assert_eq!(bob.winnings, 750);
        assert!(alice.winnings + bob.winnings <= market.total_staked);
    }

    #[test]
    fn test_claim_quote_rejects_loser() {
        let mut market = open_market();
        market.stake(ALICE, 42, 400, TEST_END_TIME - 10).unwrap();
        market.stake(BOB, 7, 600, TEST_END_TIME - 9).unwrap();
        market.resolve(42, TEST_END_TIME).unwrap();

        let err = market.claim_quote(BOB, 0).unwrap_err();
        assert_eq!(err, MarketError::NotAWinner);
    }

    #[test]
    fn test_claim_quote_rejects_non_participant() {
        let mut market = open_market();
        market.stake(ALICE, 42, 400, TEST_END_TIME - 10).unwrap();
        market.resolve(42, TEST_END_TIME).unwrap();

        let err = market.claim_quote(CAROL, 0).unwrap_err();
        assert_eq!(err, MarketError::NoPosition);
    }

    #[test]
    fn test_claim_quote_before_resolution_fails() {
        let mut market = open_market();
        market.stake(ALICE, 42, 400, TEST_END_TIME - 10).unwrap();

        let err = market.claim_quote(ALICE, 0).unwrap_err();
        assert_eq!(err, MarketError::NotResolved);
    }

    #[test]
    fn test_payout_sum_never_exceeds_pool_after_fee() {
        // Awkward amounts so floor division leaves dust behind
        let mut market = open_market();
        market.stake(ALICE, 42, 333, TEST_END_TIME - 10).unwrap();
        market.stake(BOB, 42, 334, TEST_END_TIME - 9).unwrap();
        market.stake(CAROL, 7, 334, TEST_END_TIME - 8).unwrap();
        market.resolve(42, TEST_END_TIME).unwrap();

        let fee_bps = 300;
        let alice = market.claim_quote(ALICE, fee_bps).unwrap();
        let bob = market.claim_quote(BOB, fee_bps).unwrap();

        let fee = market.total_staked * fee_bps as Value / BPS_DENOMINATOR;
        assert!(alice.winnings + bob.winnings <= market.total_staked - fee);
        assert!(alice.gross + bob.gross <= market.total_staked);
        assert!(alice.winnings <= alice.gross);
    }

    #[test]
    fn test_status_summary() {
        let mut market = open_market();
        assert_eq!(market.status(TEST_END_TIME - 10), "Open - accepting stakes");
        assert_eq!(market.status(TEST_END_TIME), "Awaiting resolution");

        market.resolve(42, TEST_END_TIME).unwrap();
        assert_eq!(market.status(TEST_END_TIME + 1), "Resolved - outcome 42");
    }
}
