//! In-memory ledgers backed by hash maps.

use std::collections::HashMap;

use crate::ledger::{CollateralAsset, LedgerError, TokenLedger};
use crate::types::{AccountId, AssetId, TokenId};

fn debit(
    balances: &mut HashMap<(AccountId, TokenId), u128>,
    account: AccountId,
    token: TokenId,
    amount: u128,
) -> Result<(), LedgerError> {
    let available = balances.get(&(account, token)).copied().unwrap_or(0);
    let remaining = available
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance {
            account,
            available,
            required: amount,
        })?;
    if remaining == 0 {
        balances.remove(&(account, token));
    } else {
        balances.insert((account, token), remaining);
    }
    Ok(())
}

// ============================================================================
// OutcomeBook
// ============================================================================

/// Outcome token balances and per-token supply.
#[derive(Debug, Clone, Default)]
pub struct OutcomeBook {
    balances: HashMap<(AccountId, TokenId), u128>,
    supply: HashMap<TokenId, u128>,
}

impl OutcomeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total minted minus burned for `token`
    pub fn total_supply(&self, token: TokenId) -> u128 {
        self.supply.get(&token).copied().unwrap_or(0)
    }
}

impl TokenLedger for OutcomeBook {
    fn mint(&mut self, to: AccountId, token: TokenId, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply(token)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to })?;
        let balance = self
            .balance_of(to, token)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to })?;
        self.supply.insert(token, supply);
        self.balances.insert((to, token), balance);
        Ok(())
    }

    fn burn(&mut self, from: AccountId, token: TokenId, amount: u128) -> Result<(), LedgerError> {
        debit(&mut self.balances, from, token, amount)?;
        // supply >= any single balance, so this cannot underflow
        let supply = self.total_supply(token).saturating_sub(amount);
        self.supply.insert(token, supply);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        token: TokenId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from, token);
        if from == to {
            return if available >= amount {
                Ok(())
            } else {
                Err(LedgerError::InsufficientBalance {
                    account: from,
                    available,
                    required: amount,
                })
            };
        }
        let credited = self
            .balance_of(to, token)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to })?;
        debit(&mut self.balances, from, token, amount)?;
        self.balances.insert((to, token), credited);
        Ok(())
    }

    fn balance_of(&self, account: AccountId, token: TokenId) -> u128 {
        self.balances.get(&(account, token)).copied().unwrap_or(0)
    }
}

// ============================================================================
// CollateralBook
// ============================================================================

/// Collateral balances for any number of assets.
#[derive(Debug, Clone, Default)]
pub struct CollateralBook {
    balances: HashMap<(AssetId, AccountId), u128>,
}

impl CollateralBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an account out of thin air (faucet for tests and demos)
    pub fn credit(&mut self, asset: AssetId, account: AccountId, amount: u128) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(asset, account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account })?;
        self.balances.insert((asset, account), balance);
        Ok(())
    }
}

impl CollateralAsset for CollateralBook {
    fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(asset, from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: from,
                available,
                required: amount,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to })?;
        self.balances.insert((asset, from), remaining);
        self.balances.insert((asset, to), credited);
        Ok(())
    }

    fn balance_of(&self, asset: AssetId, account: AccountId) -> u128 {
        self.balances.get(&(asset, account)).copied().unwrap_or(0)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketId;

    fn alice() -> AccountId {
        AccountId::derive(b"alice")
    }

    fn bob() -> AccountId {
        AccountId::derive(b"bob")
    }

    fn token(index: u8) -> TokenId {
        TokenId::new(MarketId::derive(b"market"), index)
    }

    #[test]
    fn test_mint_burn_supply() {
        let mut book = OutcomeBook::new();
        book.mint(alice(), token(0), 100).unwrap();
        book.mint(bob(), token(0), 50).unwrap();
        assert_eq!(book.total_supply(token(0)), 150);
        assert_eq!(book.total_supply(token(1)), 0);

        book.burn(alice(), token(0), 40).unwrap();
        assert_eq!(book.balance_of(alice(), token(0)), 60);
        assert_eq!(book.total_supply(token(0)), 110);
    }

    #[test]
    fn test_burn_more_than_balance_fails_cleanly() {
        let mut book = OutcomeBook::new();
        book.mint(alice(), token(1), 10).unwrap();
        let err = book.burn(alice(), token(1), 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: alice(),
                available: 10,
                required: 11
            }
        );
        assert_eq!(book.balance_of(alice(), token(1)), 10);
        assert_eq!(book.total_supply(token(1)), 10);
    }

    #[test]
    fn test_outcome_transfer() {
        let mut book = OutcomeBook::new();
        book.mint(alice(), token(0), 100).unwrap();
        book.transfer(alice(), bob(), token(0), 30).unwrap();
        assert_eq!(book.balance_of(alice(), token(0)), 70);
        assert_eq!(book.balance_of(bob(), token(0)), 30);

        book.transfer(alice(), alice(), token(0), 70).unwrap();
        assert_eq!(book.balance_of(alice(), token(0)), 70);
        assert!(book.transfer(bob(), alice(), token(0), 31).is_err());
    }

    #[test]
    fn test_mint_overflow() {
        let mut book = OutcomeBook::new();
        book.mint(alice(), token(0), u128::MAX).unwrap();
        assert_eq!(
            book.mint(alice(), token(0), 1),
            Err(LedgerError::Overflow { account: alice() })
        );
    }

    #[test]
    fn test_collateral_transfer() {
        let usdc = AssetId::derive(b"usdc");
        let mut book = CollateralBook::new();
        book.credit(usdc, alice(), 1_000).unwrap();

        book.transfer(usdc, alice(), bob(), 400).unwrap();
        assert_eq!(book.balance_of(usdc, alice()), 600);
        assert_eq!(book.balance_of(usdc, bob()), 400);

        assert!(book.transfer(usdc, bob(), alice(), 401).is_err());
        assert_eq!(book.balance_of(usdc, bob()), 400);

        // Balances are per asset
        assert_eq!(book.balance_of(AssetId::derive(b"dai"), alice()), 0);
    }
}
