//! Per-market liquidity pool.
//!
//! A pool holds the LMSR state of one market: the liquidity parameter `b`,
//! the collateral it was credited, the signed net-sold vector `q` and the LP
//! share register.
//!
//! Every state change is split into a `quote_*` method that validates and
//! computes the result without touching the pool, and an `apply_*` method
//! that commits a quote. The exchange calls both inside one atomic operation.
//!
//! ## Liability reserve
//!
//! Liquidity providers may exit at any time, but never with collateral that
//! outstanding outcome tokens can still claim. What those tokens can claim
//! depends on the market state ([`Exposure`]); the reserve is the matching
//! sum of positive `q_i`, and only collateral above it is withdrawable.
//!
//! While the winner is unknown the reserve is the largest `q_i`, so an
//! exiting provider also takes `ratio * (max q - q_i)` tokens of every
//! outcome. Whichever outcome wins, that tops the payout up to
//! `ratio * (collateral - q_winner)`, the same as a provider who stayed.
//!
//! ## Solvency
//!
//! No trade may leave a positive `q_i` above pool collateral. With a
//! subsidy of at least `b * ln(n)` the guard never fires; it matters for
//! thinner pools and after providers have exited.

use std::collections::BTreeMap;

use crate::amm::lmsr;
use crate::error::{Error, Result};
use crate::math::wide::mul_div;
use crate::math::MathError;
use crate::types::{AccountId, AssetId, Fixed, MarketId};

/// Which outcome tokens may still be redeemed against the pool's collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exposure {
    /// Unresolved: any single outcome may win
    LargestOutcome,
    /// Every outcome is refundable (invalid-refund markets)
    AllOutcomes,
    /// Resolved valid: only the winner pays
    Outcome(u8),
    /// Resolved invalid without refunds: nothing pays
    Nothing,
}

/// Result of a buy or sell quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub outcome: u8,
    /// Outcome tokens minted (buy) or burned (sell)
    pub tokens: u128,
    /// Collateral paid (buy) or received (sell)
    pub collateral: u128,
}

/// What a provider receives for burning LP shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityWithdrawal {
    pub shares: u128,
    pub collateral: u128,
    /// Surplus outcome tokens per outcome, zero where `q_i >= 0`
    pub tokens: Vec<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    market_id: MarketId,
    collateral_asset: AssetId,

    /// Liquidity parameter `b`
    liquidity: Fixed,

    /// Collateral credited to the pool
    collateral: u128,

    total_shares: u128,

    /// Net outcome tokens sold, one entry per outcome
    net_sold: Vec<Fixed>,

    /// LP shares per provider (sum == total_shares)
    shares: BTreeMap<AccountId, u128>,
}

impl Pool {
    /// Create an empty pool.
    ///
    /// # Errors
    ///
    /// * `ZeroLiquidityParameter` - `liquidity` is not strictly positive
    pub fn new(
        market_id: MarketId,
        collateral_asset: AssetId,
        outcome_count: u8,
        liquidity: Fixed,
    ) -> Result<Self> {
        if !liquidity.is_positive() {
            return Err(Error::ZeroLiquidityParameter);
        }
        Ok(Self {
            market_id,
            collateral_asset,
            liquidity,
            collateral: 0,
            total_shares: 0,
            net_sold: vec![Fixed::ZERO; outcome_count as usize],
            shares: BTreeMap::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn market_id(&self) -> MarketId {
        self.market_id
    }

    #[inline]
    pub fn collateral_asset(&self) -> AssetId {
        self.collateral_asset
    }

    #[inline]
    pub fn liquidity(&self) -> Fixed {
        self.liquidity
    }

    #[inline]
    pub fn collateral(&self) -> u128 {
        self.collateral
    }

    #[inline]
    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    #[inline]
    pub fn net_sold(&self) -> &[Fixed] {
        &self.net_sold
    }

    #[inline]
    pub fn outcome_count(&self) -> usize {
        self.net_sold.len()
    }

    pub fn shares_of(&self, provider: &AccountId) -> u128 {
        self.shares.get(provider).copied().unwrap_or(0)
    }

    /// Providers and their share balances, ordered by account
    pub fn providers(&self) -> impl Iterator<Item = (&AccountId, &u128)> {
        self.shares.iter()
    }

    pub fn prices(&self) -> Result<Vec<Fixed>> {
        Ok(lmsr::prices(&self.net_sold, self.liquidity)?)
    }

    /// Current value of the cost function
    pub fn cost(&self) -> Result<Fixed> {
        Ok(lmsr::cost(&self.net_sold, self.liquidity)?)
    }

    fn index(&self, outcome: u8) -> Result<usize> {
        let index = outcome as usize;
        if index >= self.net_sold.len() {
            return Err(Error::OutcomeOutOfRange {
                outcome,
                count: self.net_sold.len() as u8,
            });
        }
        Ok(index)
    }

    fn ensure_liquidity(&self) -> Result<()> {
        if self.total_shares == 0 {
            return Err(Error::NoLiquidity(self.market_id));
        }
        Ok(())
    }

    // ========================================================================
    // Trading
    // ========================================================================

    /// Tokens of `outcome` that `amount` collateral buys.
    ///
    /// # Errors
    ///
    /// * `InsufficientPoolCollateral` - the pool could not pay the bought
    ///   outcome's tokens out of collateral plus `amount`
    pub fn quote_buy(&self, outcome: u8, amount: u128, max_doublings: u32) -> Result<Quote> {
        let index = self.index(outcome)?;
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        self.ensure_liquidity()?;

        let budget = Fixed::from_amount(amount).ok_or(MathError::Overflow)?;
        let delta = lmsr::solve_buy(&self.net_sold, self.liquidity, index, budget, max_doublings)?;

        // Only q_i grows, so only outcome i can become uncovered
        let owed = self.net_sold[index].try_add(delta)?.to_amount().unwrap_or(0);
        let available = self.collateral.checked_add(amount).ok_or(MathError::Overflow)?;
        if owed > available {
            return Err(Error::InsufficientPoolCollateral {
                available,
                required: owed,
            });
        }
        Ok(Quote {
            outcome,
            tokens: delta.to_amount().ok_or(MathError::Overflow)?,
            collateral: amount,
        })
    }

    pub fn apply_buy(&mut self, quote: &Quote) -> Result<()> {
        let index = self.index(quote.outcome)?;
        let tokens = Fixed::from_amount(quote.tokens).ok_or(MathError::Overflow)?;
        let collateral = self
            .collateral
            .checked_add(quote.collateral)
            .ok_or(MathError::Overflow)?;
        let sold = self.net_sold[index].try_add(tokens)?;

        self.collateral = collateral;
        self.net_sold[index] = sold;
        Ok(())
    }

    /// Collateral returned for selling `tokens` of `outcome`.
    ///
    /// # Errors
    ///
    /// * `InsufficientPoolCollateral` - the return plus the largest
    ///   remaining `q_i` exceeds pool collateral
    pub fn quote_sell(&self, outcome: u8, tokens: u128) -> Result<Quote> {
        let index = self.index(outcome)?;
        if tokens == 0 {
            return Err(Error::ZeroAmount);
        }
        self.ensure_liquidity()?;

        let delta = Fixed::from_amount(tokens).ok_or(MathError::Overflow)?;
        let proceeds = lmsr::sell_return(&self.net_sold, self.liquidity, index, delta)?
            .to_amount()
            .ok_or(MathError::Overflow)?;

        let sold = self.net_sold[index].try_sub(delta)?;
        let largest = self
            .net_sold
            .iter()
            .enumerate()
            .map(|(i, q)| if i == index { sold } else { *q })
            .map(|q| q.to_amount().unwrap_or(0))
            .max()
            .unwrap_or(0);
        let required = proceeds.checked_add(largest).ok_or(MathError::Overflow)?;
        if required > self.collateral {
            return Err(Error::InsufficientPoolCollateral {
                available: self.collateral,
                required,
            });
        }
        Ok(Quote {
            outcome,
            tokens,
            collateral: proceeds,
        })
    }

    pub fn apply_sell(&mut self, quote: &Quote) -> Result<()> {
        let index = self.index(quote.outcome)?;
        let tokens = Fixed::from_amount(quote.tokens).ok_or(MathError::Overflow)?;
        let collateral = self
            .collateral
            .checked_sub(quote.collateral)
            .ok_or(Error::InsufficientPoolCollateral {
                available: self.collateral,
                required: quote.collateral,
            })?;
        let sold = self.net_sold[index].try_sub(tokens)?;

        self.collateral = collateral;
        self.net_sold[index] = sold;
        Ok(())
    }

    // ========================================================================
    // Liquidity
    // ========================================================================

    /// Collateral that outstanding outcome tokens can still claim
    pub fn liability_reserve(&self, exposure: Exposure) -> u128 {
        let owed = |q: &Fixed| q.to_amount().unwrap_or(0);
        match exposure {
            Exposure::LargestOutcome => self.net_sold.iter().map(owed).max().unwrap_or(0),
            Exposure::AllOutcomes => self
                .net_sold
                .iter()
                .map(owed)
                .fold(0u128, |total, q| total.saturating_add(q)),
            Exposure::Outcome(winner) => self.net_sold.get(winner as usize).map(owed).unwrap_or(0),
            Exposure::Nothing => 0,
        }
    }

    /// Pool collateral above the liability reserve
    pub fn withdrawable(&self, exposure: Exposure) -> u128 {
        self.collateral.saturating_sub(self.liability_reserve(exposure))
    }

    /// Shares minted for depositing `amount` collateral.
    ///
    /// The first deposit mints `initial_shares`; later ones mint
    /// `amount * total_shares / collateral`, rounded down.
    pub fn quote_add_liquidity(&self, amount: u128, initial_shares: u128) -> Result<u128> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        if self.total_shares == 0 {
            return Ok(initial_shares);
        }
        if self.collateral == 0 {
            return Err(Error::NoLiquidity(self.market_id));
        }
        Ok(mul_div(amount, self.total_shares, self.collateral).ok_or(MathError::Overflow)?)
    }

    pub fn apply_add_liquidity(&mut self, provider: AccountId, amount: u128, shares: u128) -> Result<()> {
        let collateral = self.collateral.checked_add(amount).ok_or(MathError::Overflow)?;
        let total = self.total_shares.checked_add(shares).ok_or(MathError::Overflow)?;
        let balance = self.shares_of(&provider).checked_add(shares).ok_or(MathError::Overflow)?;

        self.collateral = collateral;
        self.total_shares = total;
        self.shares.insert(provider, balance);
        Ok(())
    }

    /// Pro-rata payout for burning `shares` of `provider`.
    ///
    /// Collateral out is the share of withdrawable collateral. Tokens out are
    /// the share of `floor - q_i` for every outcome below `floor`, where
    /// `floor` is the largest positive `q_i` under
    /// [`Exposure::LargestOutcome`] and zero otherwise. Both round down; the dust stays with the remaining
    /// providers, so a later exit can receive a few raw units more than its
    /// exact share.
    pub fn quote_remove_liquidity(
        &self,
        provider: &AccountId,
        shares: u128,
        exposure: Exposure,
    ) -> Result<LiquidityWithdrawal> {
        if shares == 0 {
            return Err(Error::ZeroAmount);
        }
        let available = self.shares_of(provider);
        if available < shares {
            return Err(Error::InsufficientShares {
                available,
                required: shares,
            });
        }

        let total = self.total_shares;
        let collateral =
            mul_div(self.withdrawable(exposure), shares, total).ok_or(MathError::Overflow)?;
        let floor = match exposure {
            Exposure::LargestOutcome => {
                Fixed::from_amount(self.liability_reserve(exposure)).ok_or(MathError::Overflow)?
            }
            _ => Fixed::ZERO,
        };
        let tokens = self
            .net_sold
            .iter()
            .map(|&q| {
                if q < floor {
                    let gap = floor.try_sub(q)?.unsigned_abs();
                    mul_div(gap, shares, total).ok_or(MathError::Overflow)
                } else {
                    Ok(0)
                }
            })
            .collect::<std::result::Result<Vec<_>, MathError>>()?;

        Ok(LiquidityWithdrawal {
            shares,
            collateral,
            tokens,
        })
    }

    pub fn apply_remove_liquidity(
        &mut self,
        provider: AccountId,
        withdrawal: &LiquidityWithdrawal,
    ) -> Result<()> {
        if withdrawal.tokens.len() != self.net_sold.len() {
            return Err(Error::LengthMismatch {
                expected: self.net_sold.len(),
                actual: withdrawal.tokens.len(),
            });
        }
        let available = self.shares_of(&provider);
        let balance = available
            .checked_sub(withdrawal.shares)
            .ok_or(Error::InsufficientShares {
                available,
                required: withdrawal.shares,
            })?;
        let collateral = self
            .collateral
            .checked_sub(withdrawal.collateral)
            .ok_or(Error::InsufficientPoolCollateral {
                available: self.collateral,
                required: withdrawal.collateral,
            })?;
        let mut net_sold = self.net_sold.clone();
        for (q, &amount) in net_sold.iter_mut().zip(&withdrawal.tokens) {
            *q = q.try_add(Fixed::from_amount(amount).ok_or(MathError::Overflow)?)?;
        }

        self.total_shares -= withdrawal.shares;
        self.collateral = collateral;
        self.net_sold = net_sold;
        if balance == 0 {
            self.shares.remove(&provider);
        } else {
            self.shares.insert(provider, balance);
        }
        Ok(())
    }

    /// Append the pool state to a state-root preimage
    pub(crate) fn encode_state(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.market_id.as_bytes());
        buf.extend_from_slice(&self.liquidity.raw().to_le_bytes());
        buf.extend_from_slice(&self.collateral.to_le_bytes());
        buf.extend_from_slice(&self.total_shares.to_le_bytes());
        for q in &self.net_sold {
            buf.extend_from_slice(&q.raw().to_le_bytes());
        }
        for (provider, shares) in &self.shares {
            buf.extend_from_slice(provider.as_bytes());
            buf.extend_from_slice(&shares.to_le_bytes());
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const INITIAL: u128 = 1_000_000_000_000_000_000_000;

    fn alice() -> AccountId {
        AccountId::derive(b"alice")
    }

    fn bob() -> AccountId {
        AccountId::derive(b"bob")
    }

    fn pool(outcomes: u8) -> Pool {
        Pool::new(
            MarketId::derive(b"market"),
            AssetId::derive(b"usdc"),
            outcomes,
            Fixed::from_raw(1_000_000_000),
        )
        .unwrap()
    }

    fn funded(outcomes: u8) -> Pool {
        let mut p = pool(outcomes);
        let shares = p.quote_add_liquidity(1_000_000_000, INITIAL).unwrap();
        p.apply_add_liquidity(alice(), 1_000_000_000, shares).unwrap();
        p
    }

    #[test]
    fn test_zero_liquidity_parameter() {
        let err = Pool::new(MarketId::ZERO, AssetId::ZERO, 2, Fixed::ZERO).unwrap_err();
        assert_eq!(err, Error::ZeroLiquidityParameter);
        assert!(Pool::new(MarketId::ZERO, AssetId::ZERO, 2, Fixed::from_int(-1)).is_err());
    }

    #[test]
    fn test_trading_requires_liquidity() {
        let p = pool(2);
        assert_eq!(
            p.quote_buy(0, 100, 96),
            Err(Error::NoLiquidity(MarketId::derive(b"market")))
        );
        assert!(matches!(p.quote_sell(0, 100), Err(Error::NoLiquidity(_))));
    }

    #[test]
    fn test_input_validation() {
        let p = funded(2);
        assert_eq!(p.quote_buy(0, 0, 96), Err(Error::ZeroAmount));
        assert_eq!(
            p.quote_buy(2, 10, 96),
            Err(Error::OutcomeOutOfRange { outcome: 2, count: 2 })
        );
        assert_eq!(p.quote_sell(1, 0), Err(Error::ZeroAmount));
    }

    #[test]
    fn test_first_and_proportional_deposits() {
        let mut p = funded(2);
        assert_eq!(p.total_shares(), INITIAL);
        assert_eq!(p.shares_of(&alice()), INITIAL);

        let shares = p.quote_add_liquidity(500_000_000, INITIAL).unwrap();
        assert_eq!(shares, INITIAL / 2);
        p.apply_add_liquidity(bob(), 500_000_000, shares).unwrap();
        assert_eq!(p.collateral(), 1_500_000_000);
        assert_eq!(p.total_shares(), INITIAL + INITIAL / 2);
    }

    #[test]
    fn test_buy_then_sell() {
        let mut p = funded(2);
        let buy = p.quote_buy(1, 100_000_000, 96).unwrap();
        p.apply_buy(&buy).unwrap();
        assert_eq!(p.collateral(), 1_100_000_000);
        assert_eq!(p.net_sold()[1].raw(), buy.tokens as i128);

        let prices = p.prices().unwrap();
        assert!(prices[1] > prices[0]);

        let sell = p.quote_sell(1, buy.tokens).unwrap();
        assert!(sell.collateral < 100_000_000);
        p.apply_sell(&sell).unwrap();
        assert_eq!(p.net_sold()[1], Fixed::ZERO);
        assert!(p.collateral() > 1_000_000_000);
    }

    #[test]
    fn test_sell_insolvency_guard() {
        // Pool has shares but no collateral: any positive return is too much
        let mut p = pool(2);
        p.apply_add_liquidity(alice(), 0, INITIAL).unwrap();
        p.net_sold[0] = Fixed::from_raw(500_000_000);
        let err = p.quote_sell(0, 100_000_000).unwrap_err();
        assert!(matches!(err, Error::InsufficientPoolCollateral { available: 0, .. }));
    }

    #[test]
    fn test_liability_reserve() {
        let mut p = funded(3);
        p.net_sold = vec![
            Fixed::from_raw(300),
            Fixed::from_raw(-50),
            Fixed::from_raw(200),
        ];
        assert_eq!(p.liability_reserve(Exposure::LargestOutcome), 300);
        assert_eq!(p.liability_reserve(Exposure::AllOutcomes), 500);
        assert_eq!(p.liability_reserve(Exposure::Outcome(2)), 200);
        assert_eq!(p.liability_reserve(Exposure::Outcome(1)), 0);
        assert_eq!(p.liability_reserve(Exposure::Nothing), 0);
        assert_eq!(p.withdrawable(Exposure::AllOutcomes), 1_000_000_000 - 500);
    }

    #[test]
    fn test_remove_liquidity_pro_rata() {
        let mut p = funded(2);
        p.net_sold = vec![Fixed::from_raw(400_000), Fixed::from_raw(-1_000_000)];

        let withdrawal = p
            .quote_remove_liquidity(&alice(), INITIAL / 4, Exposure::LargestOutcome)
            .unwrap();
        assert_eq!(withdrawal.collateral, (1_000_000_000 - 400_000) / 4);
        // Surplus of outcome 1 plus the top-up to the largest outcome
        assert_eq!(withdrawal.tokens, vec![0, 350_000]);

        p.apply_remove_liquidity(alice(), &withdrawal).unwrap();
        assert_eq!(p.shares_of(&alice()), INITIAL - INITIAL / 4);
        assert_eq!(p.net_sold()[1].raw(), -650_000);
        assert_eq!(p.collateral(), 1_000_000_000 - (1_000_000_000 - 400_000) / 4);
    }

    #[test]
    fn test_resolved_exit_takes_only_surplus() {
        let mut p = funded(2);
        p.net_sold = vec![Fixed::from_raw(400_000), Fixed::from_raw(-1_000_000)];

        let withdrawal = p
            .quote_remove_liquidity(&alice(), INITIAL / 4, Exposure::Outcome(0))
            .unwrap();
        assert_eq!(withdrawal.collateral, (1_000_000_000 - 400_000) / 4);
        assert_eq!(withdrawal.tokens, vec![0, 250_000]);
    }

    #[test]
    fn test_open_exit_matches_staying_provider() {
        let mut p = funded(2);
        let shares = p.quote_add_liquidity(1_000_000_000, INITIAL).unwrap();
        p.apply_add_liquidity(bob(), 1_000_000_000, shares).unwrap();
        let buy = p.quote_buy(0, 300_000_000, 96).unwrap();
        p.apply_buy(&buy).unwrap();

        let exit = p
            .quote_remove_liquidity(&bob(), shares, Exposure::LargestOutcome)
            .unwrap();
        assert_eq!(exit.collateral, (2_300_000_000 - buy.tokens) / 2);
        assert_eq!(exit.tokens, vec![0, buy.tokens / 2]);
        p.apply_remove_liquidity(bob(), &exit).unwrap();

        // Every outcome stays covered after the exit
        let largest = p.liability_reserve(Exposure::LargestOutcome);
        assert!(largest <= p.collateral());

        // Outcome 1 wins: bob redeems the outcome 1 tokens, alice takes the rest
        let stayed = p.withdrawable(Exposure::Outcome(1));
        let left = exit.collateral + exit.tokens[1];
        assert!(stayed >= left && stayed - left <= 2, "stayed={} left={}", stayed, left);
        assert_eq!(stayed + left, 2_300_000_000);
    }

    #[test]
    fn test_buy_guard_on_thin_pool() {
        // One unit of subsidy against b = 1000 units
        let mut p = pool(2);
        let shares = p.quote_add_liquidity(1_000_000, INITIAL).unwrap();
        p.apply_add_liquidity(alice(), 1_000_000, shares).unwrap();

        let err = p.quote_buy(0, 500_000_000, 96).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientPoolCollateral { available: 501_000_000, required } if required > 501_000_000
        ));

        let small = p.quote_buy(0, 500_000, 96).unwrap();
        assert!(small.tokens <= 1_500_000);
        p.apply_buy(&small).unwrap();
        assert!(p.liability_reserve(Exposure::LargestOutcome) <= p.collateral());
    }

    #[test]
    fn test_sell_guard_covers_other_outcomes() {
        let mut p = funded(2);
        p.net_sold = vec![Fixed::from_raw(900_000_000), Fixed::from_raw(900_000_000)];

        // Paying ~219M would leave outcome 0 uncovered
        let err = p.quote_sell(1, 500_000_000).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientPoolCollateral { available: 1_000_000_000, .. }
        ));

        let sell = p.quote_sell(1, 100_000_000).unwrap();
        assert!(sell.collateral + 900_000_000 <= 1_000_000_000);
    }

    #[test]
    fn test_remove_all_liquidity() {
        let mut p = funded(2);
        let withdrawal = p
            .quote_remove_liquidity(&alice(), INITIAL, Exposure::LargestOutcome)
            .unwrap();
        assert_eq!(withdrawal.collateral, 1_000_000_000);
        p.apply_remove_liquidity(alice(), &withdrawal).unwrap();
        assert_eq!(p.total_shares(), 0);
        assert_eq!(p.collateral(), 0);
        assert_eq!(p.providers().count(), 0);
    }

    #[test]
    fn test_remove_more_than_owned() {
        let p = funded(2);
        assert_eq!(
            p.quote_remove_liquidity(&bob(), 1, Exposure::LargestOutcome),
            Err(Error::InsufficientShares {
                available: 0,
                required: 1
            })
        );
    }

    #[test]
    fn test_deposit_into_drained_pool() {
        let mut p = pool(2);
        p.apply_add_liquidity(alice(), 0, INITIAL).unwrap();
        assert_eq!(
            p.quote_add_liquidity(10, INITIAL),
            Err(Error::NoLiquidity(MarketId::derive(b"market")))
        );
    }

    #[test]
    fn test_state_encoding_tracks_changes() {
        let mut p = funded(2);
        let mut before = Vec::new();
        p.encode_state(&mut before);
        let buy = p.quote_buy(0, 1_000, 96).unwrap();
        p.apply_buy(&buy).unwrap();
        let mut after = Vec::new();
        p.encode_state(&mut after);
        assert_ne!(before, after);
    }
}
