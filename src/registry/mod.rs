//! Market registry and resolution state machine.
//!
//! ## Lifecycle
//!
//! ```text
//! Open ──request_resolution──▶ Resolvable ──finalize──▶ Resolved
//! ```
//!
//! - **Open**: trading and liquidity operations permitted until the deadline.
//! - **Resolvable**: resolution requested (after the deadline, or at any time
//!   with the early-resolution flag). Trading is rejected.
//! - **Resolved**: terminal. Winning outcome and invalid flag never change.
//!
//! ## Storage
//!
//! Markets are never removed, so the slab keys are dense and iteration
//! follows creation order:
//!
//! - **Slab**: market records
//! - **HashMap**: market id to slab key

mod market;
mod vault;

pub use market::Market;
pub use vault::CollateralVault;

use std::collections::HashMap;

use slab::Slab;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::oracle::OracleSet;
use crate::types::{MarketConfig, MarketId, MarketStatus, Resolution, MAX_OUTCOMES, MIN_OUTCOMES};

#[derive(Debug, Default)]
pub struct MarketRegistry {
    /// Market storage, key = slab index
    markets: Slab<Market>,

    /// Market id to slab key
    index: HashMap<MarketId, usize>,

    /// Collateral held for each market
    vault: CollateralVault,
}

impl MarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            markets: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            vault: CollateralVault::new(),
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn get(&self, id: &MarketId) -> Option<&Market> {
        self.index.get(id).and_then(|&key| self.markets.get(key))
    }

    pub fn market(&self, id: &MarketId) -> Result<&Market> {
        self.get(id).ok_or(Error::MarketNotFound(*id))
    }

    fn market_mut(&mut self, id: &MarketId) -> Result<&mut Market> {
        let key = *self.index.get(id).ok_or(Error::MarketNotFound(*id))?;
        self.markets.get_mut(key).ok_or(Error::MarketNotFound(*id))
    }

    /// Markets in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Market> {
        self.markets.iter().map(|(_, market)| market)
    }

    pub fn is_open(&self, id: &MarketId, now: u64) -> Result<bool> {
        Ok(self.market(id)?.is_open(now))
    }

    /// The market, if it is open for trading at `now`
    pub fn ensure_open(&self, id: &MarketId, now: u64) -> Result<&Market> {
        let market = self.market(id)?;
        if !market.is_open(now) {
            return Err(Error::MarketNotOpen {
                market: *id,
                status: market.status(),
            });
        }
        Ok(market)
    }

    #[inline]
    pub fn vault(&self) -> &CollateralVault {
        &self.vault
    }

    #[inline]
    pub(crate) fn vault_mut(&mut self) -> &mut CollateralVault {
        &mut self.vault
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Register a new market in state Open with an empty vault.
    ///
    /// # Errors
    ///
    /// * `OutcomeCountOutOfRange` - outcome count outside 2..=8
    /// * `ZeroAddress` - zero collateral asset or oracle id
    /// * `UnknownOracle` - oracle id not in `oracles`
    /// * `MarketExists` - a market with the same configuration exists
    pub fn create(&mut self, config: MarketConfig, oracles: &OracleSet) -> Result<MarketId> {
        if !(MIN_OUTCOMES..=MAX_OUTCOMES).contains(&config.outcome_count) {
            return Err(Error::OutcomeCountOutOfRange(config.outcome_count));
        }
        if config.collateral().is_zero() {
            return Err(Error::ZeroAddress("collateral asset"));
        }
        if config.oracle().is_zero() {
            return Err(Error::ZeroAddress("oracle"));
        }
        if !oracles.contains(&config.oracle()) {
            return Err(Error::UnknownOracle(config.oracle().to_hex()));
        }

        let id = config.market_id()?;
        if self.index.contains_key(&id) {
            return Err(Error::MarketExists(id));
        }

        info!(
            market = %id,
            outcomes = config.outcome_count,
            deadline = config.deadline,
            flags = config.flags,
            "market created"
        );
        let key = self.markets.insert(Market::new(id, config));
        self.index.insert(id, key);
        Ok(id)
    }

    /// Ask the market's oracle for an answer and move Open to Resolvable.
    ///
    /// Permissionless and idempotent. Returns whether the oracle already
    /// holds an answer, in which case [`MarketRegistry::finalize`] succeeds
    /// right away.
    pub fn request_resolution(
        &mut self,
        id: &MarketId,
        now: u64,
        oracles: &mut OracleSet,
    ) -> Result<bool> {
        let market = self.market(id)?;
        let previous = market.status();
        if previous == MarketStatus::Resolved {
            return Err(Error::AlreadyResolved(*id));
        }
        if now < market.deadline() && !market.config().early_resolution() {
            return Err(Error::DeadlineNotReached {
                market: *id,
                deadline: market.deadline(),
                now,
            });
        }
        let oracle_id = market.config().oracle();
        let question = market.config().question();

        // Status first, oracle call last; undo the status if the call fails
        self.market_mut(id)?.set_status(MarketStatus::Resolvable);
        let answered = oracles
            .get_mut(&oracle_id)
            .ok_or_else(|| Error::UnknownOracle(oracle_id.to_hex()))
            .and_then(|oracle| {
                oracle.request_resolution(question)?;
                Ok(oracle.outcome(question)?.resolved)
            });
        let answered = match answered {
            Ok(answered) => answered,
            Err(err) => {
                self.market_mut(id)?.set_status(previous);
                return Err(err);
            }
        };

        if previous == MarketStatus::Open {
            info!(market = %id, now, answered, "market resolvable");
        }
        Ok(answered)
    }

    /// Read the oracle's answer and move Resolvable to Resolved.
    pub fn finalize(&mut self, id: &MarketId, oracles: &OracleSet) -> Result<Resolution> {
        let market = self.market(id)?;
        match market.status() {
            MarketStatus::Open => return Err(Error::NotResolvable(*id)),
            MarketStatus::Resolved => return Err(Error::AlreadyResolved(*id)),
            MarketStatus::Resolvable => {}
        }

        let oracle_id = market.config().oracle();
        let report = oracles
            .get(&oracle_id)
            .ok_or_else(|| Error::UnknownOracle(oracle_id.to_hex()))?
            .outcome(market.config().question())?;
        if !report.resolved {
            return Err(Error::OracleNotResolved);
        }
        let count = market.outcome_count();
        if !report.invalid && report.winning_outcome >= count {
            warn!(
                market = %id,
                outcome = report.winning_outcome,
                count,
                "oracle reported an out-of-range winner"
            );
            return Err(Error::InvalidOracleReport {
                outcome: report.winning_outcome,
                count,
            });
        }

        let resolution = Resolution {
            winning_outcome: report.winning_outcome,
            invalid: report.invalid,
            resolved_at: report.resolved_at,
        };
        self.market_mut(id)?.set_resolution(resolution);
        info!(
            market = %id,
            winner = resolution.winning_outcome,
            invalid = resolution.invalid,
            resolved_at = resolution.resolved_at,
            "market resolved"
        );
        Ok(resolution)
    }

    /// Check that tokens of `outcome` may be redeemed 1:1 right now.
    pub fn authorize_redemption(&self, id: &MarketId, outcome: u8) -> Result<&Market> {
        let market = self.market(id)?;
        let resolution = market.resolution().ok_or(Error::NotResolved(*id))?;
        market.check_outcome(outcome)?;
        if resolution.invalid {
            if !market.config().invalid_refunds() {
                return Err(Error::InvalidWithoutRefund(*id));
            }
        } else if outcome != resolution.winning_outcome {
            return Err(Error::NotWinningOutcome {
                outcome,
                winner: resolution.winning_outcome,
            });
        }
        Ok(market)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
