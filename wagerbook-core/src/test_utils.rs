//! Common test utilities for wagerbook-core tests.
//!
//! Provides a manually advanced clock, a treasury double that rejects
//! every credit, and a canned book constructor shared across modules.

use crate::book::MarketBook;
use crate::env::{CashTreasury, Clock, Timestamp, Treasury, Value};
use crate::error::{MarketError, Result};
use std::cell::Cell;
use std::rc::Rc;

/// Manually advanced clock. Clones share the same underlying time, so a
/// test can keep a handle and move time forward after handing the clock
/// to a book.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: Rc<Cell<Timestamp>>,
}

impl TestClock {
    /// Create a clock pinned at `now`
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    /// Move forward by `seconds`
    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Treasury double whose credits always fail, for exercising rollback
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTreasury;

impl Treasury for FailingTreasury {
    fn credit(&mut self, to: &str, _amount: Value) -> Result<()> {
        Err(MarketError::TransferFailed(format!(
            "treasury rejected credit to {to}"
        )))
    }
}

/// A fresh book at `constants::TEST_START_TIME` with the standard test
/// operator, plus the clock handle for advancing time.
pub fn test_book() -> (MarketBook<TestClock, CashTreasury>, TestClock) {
    let clock = TestClock::at(constants::TEST_START_TIME);
    let book = MarketBook::new(constants::OPERATOR, clock.clone(), CashTreasury::new());
    (book, clock)
}

/// Common test constants
pub mod constants {
    use crate::env::Timestamp;

    /// Privileged operator identity used in tests
    pub const OPERATOR: &str = "operator";

    /// Standard participant identities
    pub const ALICE: &str = "alice";
    pub const BOB: &str = "bob";
    pub const CAROL: &str = "carol";

    /// Time at which test books start
    pub const TEST_START_TIME: Timestamp = 1_000_000;

    /// Standard market deadline used in tests
    pub const TEST_END_TIME: Timestamp = 1_000_000 + 86_400;
}
