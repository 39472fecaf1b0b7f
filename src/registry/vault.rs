//! Collateral vault: how much collateral the custody account holds per market.
//!
//! All collateral of all markets sits in one custody account of the
//! collateral ledger. The vault tracks each market's share of it so that no
//! market can pay out collateral deposited for another.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::math::MathError;
use crate::types::MarketId;

#[derive(Debug, Clone, Default)]
pub struct CollateralVault {
    balances: HashMap<MarketId, u128>,
}

impl CollateralVault {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn balance(&self, market: MarketId) -> u128 {
        self.balances.get(&market).copied().unwrap_or(0)
    }

    pub fn deposit(&mut self, market: MarketId, amount: u128) -> Result<u128> {
        let balance = self
            .balance(market)
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        self.balances.insert(market, balance);
        Ok(balance)
    }

    pub fn withdraw(&mut self, market: MarketId, amount: u128) -> Result<u128> {
        let available = self.balance(market);
        let balance = available
            .checked_sub(amount)
            .ok_or(Error::InsufficientVault {
                market,
                available,
                required: amount,
            })?;
        self.balances.insert(market, balance);
        Ok(balance)
    }

    /// Reset a market's balance to a previously observed value
    pub(crate) fn restore(&mut self, market: MarketId, balance: u128) {
        self.balances.insert(market, balance);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_withdraw() {
        let market = MarketId::derive(b"m");
        let mut vault = CollateralVault::new();
        assert_eq!(vault.balance(market), 0);
        assert_eq!(vault.deposit(market, 100).unwrap(), 100);
        assert_eq!(vault.withdraw(market, 30).unwrap(), 70);
        assert_eq!(
            vault.withdraw(market, 71),
            Err(Error::InsufficientVault {
                market,
                available: 70,
                required: 71
            })
        );
        assert_eq!(vault.balance(market), 70);
    }

    #[test]
    fn test_markets_are_isolated() {
        let a = MarketId::derive(b"a");
        let b = MarketId::derive(b"b");
        let mut vault = CollateralVault::new();
        vault.deposit(a, 50).unwrap();
        assert!(vault.withdraw(b, 1).is_err());
        assert_eq!(vault.balance(a), 50);
    }

    #[test]
    fn test_restore() {
        let market = MarketId::derive(b"m");
        let mut vault = CollateralVault::new();
        vault.deposit(market, 10).unwrap();
        vault.restore(market, 4);
        assert_eq!(vault.balance(market), 4);
    }
}
