//! # Market Book
//!
//! The registry that owns every market, the privileged lifecycle
//! transitions, and the payout engine's fund accounting. All mutating
//! operations take the caller's [`AccountId`] explicitly; privileged ones
//! compare it against the operator recorded at construction.
//!
//! ## Fund accounting
//!
//! The book tracks the value it physically holds in `balance`: every stake
//! adds to it, every payout or fee withdrawal subtracts from it. Fees are
//! segregated: the fee share withheld by each claim moves into
//! `accrued_fees` (a sub-account of `balance`), and `withdraw_fees` pays
//! out only that sub-account. Stakes of markets that have not been claimed
//! out can never leave through the fee path.

use crate::env::{AccountId, Clock, MarketId, SystemClock, Timestamp, Treasury, Value};
use crate::env::CashTreasury;
use crate::error::{MarketError, Result};
use crate::event::MarketEvent;
use crate::market::Market;
use crate::MAX_FEE_BPS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Durable state of a market book.
///
/// This is the entirety of the ledger's persistent state; embedders that
/// need persistence serialize this struct and rebuild the book around it
/// with [`MarketBook::from_parts`].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BookState {
    /// The privileged identity allowed to create/resolve markets and
    /// manage fees
    pub operator: AccountId,

    /// Global platform fee in basis points, applied at claim time
    pub fee_bps: u16,

    /// Next market id to allocate; ids are sequential starting at 1
    pub next_id: MarketId,

    /// Value physically held by the book: stakes in, payouts and fee
    /// withdrawals out
    pub balance: Value,

    /// Fee share withheld by claims so far, not yet withdrawn.
    /// Always a sub-account of `balance`.
    pub accrued_fees: Value,

    /// All markets ever created, keyed by id
    pub markets: BTreeMap<MarketId, Market>,
}

impl BookState {
    fn new(operator: AccountId) -> Self {
        Self {
            operator,
            fee_bps: 0,
            next_id: 1,
            balance: 0,
            accrued_fees: 0,
            markets: BTreeMap::new(),
        }
    }
}

/// The market registry and payout engine.
///
/// Generic over its environment: a [`Clock`] sampled once per operation
/// and a [`Treasury`] that receives outbound payouts. Every mutating
/// operation either commits fully or fails leaving state untouched,
/// including the outbound credit in [`claim_winnings`](Self::claim_winnings).
#[derive(Debug)]
pub struct MarketBook<C = SystemClock, T = CashTreasury> {
    clock: C,
    treasury: T,
    state: BookState,
    events: Vec<MarketEvent>,
}

impl<C: Clock, T: Treasury> MarketBook<C, T> {
    /// Create an empty book owned by `operator`
    pub fn new(operator: impl Into<AccountId>, clock: C, treasury: T) -> Self {
        Self {
            clock,
            treasury,
            state: BookState::new(operator.into()),
            events: Vec::new(),
        }
    }

    /// Rebuild a book around previously persisted state
    pub fn from_parts(state: BookState, clock: C, treasury: T) -> Self {
        Self {
            clock,
            treasury,
            state,
            events: Vec::new(),
        }
    }

    /// Split the book back into its durable state and environment
    pub fn into_parts(self) -> (BookState, C, T) {
        (self.state, self.clock, self.treasury)
    }

    /// Create a new market. Operator only; the deadline must be strictly
    /// in the future. Returns the allocated sequential id.
    pub fn create_market(
        &mut self,
        caller: &str,
        title: impl Into<String>,
        description: impl Into<String>,
        end_time: Timestamp,
    ) -> Result<MarketId> {
        self.require_operator(caller)?;

        let now = self.clock.now();
        if end_time <= now {
            return Err(MarketError::InvalidDeadline { end_time, now });
        }

        let id = self.state.next_id;
        let title = title.into();
        self.state
            .markets
            .insert(id, Market::new(title.clone(), description.into(), end_time));
        self.state.next_id += 1;

        self.events.push(MarketEvent::Created {
            market_id: id,
            title,
            end_time,
        });
        Ok(id)
    }

    /// Stake `value` on `prediction` in market `id` for `caller`.
    ///
    /// Open to anyone while the market is open. The staked value is
    /// absorbed into the book's held balance.
    pub fn stake(
        &mut self,
        caller: &str,
        id: MarketId,
        prediction: u64,
        value: Value,
    ) -> Result<()> {
        let now = self.clock.now();
        let market = self
            .state
            .markets
            .get_mut(&id)
            .ok_or(MarketError::MarketNotFound(id))?;

        market.stake(caller, prediction, value, now)?;
        self.state.balance += value;

        self.events.push(MarketEvent::StakePlaced {
            market_id: id,
            account: caller.to_string(),
            prediction,
            value,
            total_staked: market.total_staked,
        });
        Ok(())
    }

    /// Resolve market `id` with the true `outcome`. Operator only, once
    /// the deadline has passed, exactly once per market.
    pub fn resolve_market(&mut self, caller: &str, id: MarketId, outcome: u64) -> Result<()> {
        self.require_operator(caller)?;

        let now = self.clock.now();
        let market = self
            .state
            .markets
            .get_mut(&id)
            .ok_or(MarketError::MarketNotFound(id))?;
        market.resolve(outcome, now)?;

        self.events.push(MarketEvent::Resolved {
            market_id: id,
            outcome,
        });
        Ok(())
    }

    /// Pay out `caller`'s winnings from resolved market `id`.
    ///
    /// At most once per (market, participant). State is finalized before
    /// the outbound credit; if the treasury rejects the credit, every
    /// effect is rolled back and the operation fails as a whole.
    pub fn claim_winnings(&mut self, caller: &str, id: MarketId) -> Result<Value> {
        let fee_bps = self.state.fee_bps;
        let market = self
            .state
            .markets
            .get_mut(&id)
            .ok_or(MarketError::MarketNotFound(id))?;

        let quote = market.claim_quote(caller, fee_bps)?;
        let fee_part = quote.gross - quote.winnings;

        // Effects before interaction: the claim is finalized and the
        // claimant's gross share leaves the pool before any transfer.
        if let Some(position) = market.positions.get_mut(caller) {
            position.claimed = true;
        }
        self.state.balance -= quote.winnings;
        self.state.accrued_fees += fee_part;

        if let Err(err) = self.treasury.credit(caller, quote.winnings) {
            // Roll the whole operation back; the failed transfer and the
            // state changes are all-or-nothing.
            if let Some(market) = self.state.markets.get_mut(&id) {
                if let Some(position) = market.positions.get_mut(caller) {
                    position.claimed = false;
                }
            }
            self.state.balance += quote.winnings;
            self.state.accrued_fees -= fee_part;
            return Err(err);
        }

        self.events.push(MarketEvent::WinningsClaimed {
            market_id: id,
            account: caller.to_string(),
            winnings: quote.winnings,
        });
        Ok(quote.winnings)
    }

    /// Set the global fee in basis points. Operator only; capped at
    /// [`MAX_FEE_BPS`]. Applies to subsequent claims across all markets.
    pub fn set_fee(&mut self, caller: &str, fee_bps: u16) -> Result<()> {
        self.require_operator(caller)?;
        if fee_bps > MAX_FEE_BPS {
            return Err(MarketError::FeeTooHigh(fee_bps));
        }

        self.state.fee_bps = fee_bps;
        self.events.push(MarketEvent::FeeUpdated { fee_bps });
        Ok(())
    }

    /// Pay all accrued fees to the operator and return the amount.
    ///
    /// Only the segregated fee ledger is paid out; stakes that have not
    /// been claimed out of their markets stay in the book.
    pub fn withdraw_fees(&mut self, caller: &str) -> Result<Value> {
        self.require_operator(caller)?;

        let amount = self.state.accrued_fees;
        if amount == 0 {
            return Err(MarketError::NoFeesAccrued);
        }

        self.state.accrued_fees = 0;
        self.state.balance -= amount;

        let operator = self.state.operator.clone();
        if let Err(err) = self.treasury.credit(&operator, amount) {
            self.state.accrued_fees = amount;
            self.state.balance += amount;
            return Err(err);
        }

        self.events.push(MarketEvent::FeesWithdrawn {
            to: operator,
            amount,
        });
        Ok(amount)
    }

    /// Read-only market lookup
    pub fn market(&self, id: MarketId) -> Result<&Market> {
        self.state
            .markets
            .get(&id)
            .ok_or(MarketError::MarketNotFound(id))
    }

    /// Read-only position lookup; `Ok(None)` for a participant who never
    /// staked in the market
    pub fn position(&self, id: MarketId, account: &str) -> Result<Option<&crate::market::Position>> {
        Ok(self.market(id)?.position(account))
    }

    /// Total value staked on the winning prediction of a resolved market
    pub fn winner_pool(&self, id: MarketId) -> Result<Value> {
        self.market(id)?.winner_pool()
    }

    /// All markets in id order
    pub fn markets(&self) -> impl Iterator<Item = (MarketId, &Market)> {
        self.state.markets.iter().map(|(id, m)| (*id, m))
    }

    /// Number of markets ever created
    pub fn market_count(&self) -> usize {
        self.state.markets.len()
    }

    /// The operator identity
    pub fn operator(&self) -> &str {
        &self.state.operator
    }

    /// Current global fee in basis points
    pub fn fee_bps(&self) -> u16 {
        self.state.fee_bps
    }

    /// Value currently held by the book
    pub fn balance(&self) -> Value {
        self.state.balance
    }

    /// Fees withheld by claims and not yet withdrawn
    pub fn accrued_fees(&self) -> Value {
        self.state.accrued_fees
    }

    /// Current time as seen by the book's clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Borrow the durable state, e.g. for persistence
    pub fn state(&self) -> &BookState {
        &self.state
    }

    /// Borrow the treasury, e.g. to inspect credited balances
    pub fn treasury(&self) -> &T {
        &self.treasury
    }

    /// Take all notification events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_operator(&self, caller: &str) -> Result<()> {
        if caller != self.state.operator {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }
}
