//! Per-market reentrancy guard.
//!
//! Every state-changing entry point of the exchange enters the guard for its
//! market and exits on return, success or failure. A second entry for the
//! same market while the first is still running fails with
//! [`Error::Reentrancy`]. Nothing stays locked between top-level calls.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::MarketId;

#[derive(Debug, Default)]
pub struct MarketLocks {
    locked: HashSet<MarketId>,
}

impl MarketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, market: MarketId) -> Result<()> {
        if !self.locked.insert(market) {
            return Err(Error::Reentrancy(market));
        }
        Ok(())
    }

    pub fn exit(&mut self, market: MarketId) {
        self.locked.remove(&market);
    }

    #[inline]
    pub fn is_locked(&self, market: &MarketId) -> bool {
        self.locked.contains(market)
    }

    /// No market is inside a call
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.locked.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
