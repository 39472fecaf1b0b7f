//! The exchange: sequences registry, pools, vault and ledgers.
//!
//! ## Operation shape
//!
//! Every state-changing call on a market runs inside [`Exchange::transact`]:
//!
//! 1. Enter the market's reentrancy guard.
//! 2. Snapshot the market's pool and vault balance.
//! 3. Checks (market openness is read once, here), then internal state
//!    mutation, then ledger calls.
//! 4. On any error restore the snapshot; ledger calls already made by the
//!    failing operation are reversed in opposite order.
//! 5. Exit the guard.
//!
//! A call therefore either completes fully or leaves no trace.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::amm::{LiquidityWithdrawal, Pool, Quote};
use crate::config::ExchangeConfig;
use crate::engine::guard::MarketLocks;
use crate::error::{Error, Result};
use crate::ledger::{CollateralAsset, LedgerError, TokenLedger};
use crate::oracle::OracleSet;
use crate::registry::{Market, MarketRegistry};
use crate::types::{
    AccountId, AssetId, Checkpoint, Fixed, MarketConfig, MarketId, MarketStatus, Resolution,
    Side, TokenId, Trade,
};

/// One ledger call. Each has an exact inverse.
#[derive(Debug, Clone, Copy)]
enum Step {
    Mint {
        to: AccountId,
        token: TokenId,
        amount: u128,
    },
    Burn {
        from: AccountId,
        token: TokenId,
        amount: u128,
    },
    Move {
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    },
}

impl Step {
    fn inverse(self) -> Step {
        match self {
            Step::Mint { to, token, amount } => Step::Burn {
                from: to,
                token,
                amount,
            },
            Step::Burn { from, token, amount } => Step::Mint {
                to: from,
                token,
                amount,
            },
            Step::Move {
                asset,
                from,
                to,
                amount,
            } => Step::Move {
                asset,
                from: to,
                to: from,
                amount,
            },
        }
    }
}

/// LMSR prediction-market exchange over a token ledger `L` and a collateral
/// ledger `C`.
///
/// ## Example
///
/// ```
/// use lmsr_markets::prelude::*;
///
/// let usdc = AssetId::derive(b"usdc");
/// let alice = AccountId::derive(b"alice");
/// let oracle_id = OracleId::derive(b"oracle");
///
/// let mut collateral = CollateralBook::new();
/// collateral.credit(usdc, alice, 2_000_000_000).unwrap();
/// let oracles = OracleSet::new().with(oracle_id, ManualOracle::new());
/// let mut exchange =
///     Exchange::new(ExchangeConfig::default(), OutcomeBook::new(), collateral, oracles).unwrap();
///
/// let config = MarketConfig::new(usdc, 1_000, MarketFlags::NONE, 2, oracle_id, QuestionId::derive(b"q"));
/// let market = exchange.create_market(config).unwrap();
/// exchange.register_amm(market, Fixed::from_raw(1_000_000_000), 0).unwrap();
/// exchange.add_liquidity(alice, market, 1_000_000_000, 0, 0).unwrap();
///
/// let trade = exchange.buy(alice, market, 1, 100_000_000, 0, 10).unwrap();
/// assert!(trade.tokens > 100_000_000);
/// let prices = exchange.prices(&market).unwrap();
/// assert!(prices[1] > prices[0]);
/// ```
#[derive(Debug)]
pub struct Exchange<L: TokenLedger, C: CollateralAsset> {
    config: ExchangeConfig,
    registry: MarketRegistry,
    pools: HashMap<MarketId, Pool>,
    ledger: L,
    collateral: C,
    oracles: OracleSet,
    locks: MarketLocks,

    /// State-changing operations applied
    sequence: u64,

    /// Trades executed, also the next trade id
    trades: u64,
}

impl<L: TokenLedger, C: CollateralAsset> Exchange<L, C> {
    /// Build an exchange. Configuration and oracles are fixed from here on.
    pub fn new(config: ExchangeConfig, ledger: L, collateral: C, oracles: OracleSet) -> Result<Self> {
        config.validate()?;
        info!(custody = %config.custody, oracles = oracles.len(), "exchange started");
        Ok(Self {
            config,
            registry: MarketRegistry::new(),
            pools: HashMap::new(),
            ledger,
            collateral,
            oracles,
            locks: MarketLocks::new(),
            sequence: 0,
            trades: 0,
        })
    }

    // ========================================================================
    // Atomicity
    // ========================================================================

    /// Run `op` as one atomic, non-reentrant operation on `market`.
    fn transact<T>(&mut self, market: MarketId, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.locks.enter(market)?;
        let pool = self.pools.get(&market).cloned();
        let vault = self.registry.vault().balance(market);

        let result = op(self);
        match &result {
            Ok(_) => self.sequence += 1,
            Err(err) => {
                debug!(%market, error = %err, "operation rejected");
                match pool {
                    Some(pool) => {
                        self.pools.insert(market, pool);
                    }
                    None => {
                        self.pools.remove(&market);
                    }
                }
                if self.registry.vault().balance(market) != vault {
                    self.registry.vault_mut().restore(market, vault);
                }
            }
        }

        self.locks.exit(market);
        result
    }

    fn apply_step(&mut self, step: Step) -> std::result::Result<(), LedgerError> {
        match step {
            Step::Mint { to, token, amount } => self.ledger.mint(to, token, amount),
            Step::Burn { from, token, amount } => self.ledger.burn(from, token, amount),
            Step::Move {
                asset,
                from,
                to,
                amount,
            } => self.collateral.transfer(asset, from, to, amount),
        }
    }

    /// Perform ledger calls in order; on failure reverse the ones already made
    fn settle(&mut self, steps: &[Step]) -> Result<()> {
        for (done, &step) in steps.iter().enumerate() {
            if let Err(err) = self.apply_step(step) {
                for &applied in steps[..done].iter().rev() {
                    if let Err(undo) = self.apply_step(applied.inverse()) {
                        warn!(?applied, error = %undo, "failed to reverse ledger call");
                    }
                }
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn require_collateral(&self, asset: AssetId, account: AccountId, amount: u128) -> Result<()> {
        let available = self.collateral.balance_of(asset, account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account,
                available,
                required: amount,
            }
            .into());
        }
        Ok(())
    }

    fn require_tokens(&self, account: AccountId, token: TokenId, amount: u128) -> Result<()> {
        let available = self.ledger.balance_of(account, token);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account,
                available,
                required: amount,
            }
            .into());
        }
        Ok(())
    }

    fn pool_mut(&mut self, market: &MarketId) -> Result<&mut Pool> {
        self.pools.get_mut(market).ok_or(Error::PoolNotFound(*market))
    }

    fn next_trade(
        &mut self,
        market: MarketId,
        side: Side,
        trader: AccountId,
        quote: &Quote,
        now: u64,
    ) -> Trade {
        self.trades += 1;
        Trade::new(
            self.trades,
            market,
            quote.outcome,
            side,
            trader,
            quote.tokens,
            quote.collateral,
            now,
        )
    }

    // ========================================================================
    // Market lifecycle
    // ========================================================================

    /// Create a market. The id is the hash of `config`.
    pub fn create_market(&mut self, config: MarketConfig) -> Result<MarketId> {
        let id = self.registry.create(config, &self.oracles)?;
        self.sequence += 1;
        Ok(id)
    }

    /// Attach an LMSR pool with liquidity parameter `liquidity` to an open market.
    pub fn register_amm(&mut self, market: MarketId, liquidity: Fixed, now: u64) -> Result<()> {
        self.transact(market, |ex| {
            let record = ex.registry.ensure_open(&market, now)?;
            if ex.pools.contains_key(&market) {
                return Err(Error::PoolExists(market));
            }
            let pool = Pool::new(
                market,
                record.config().collateral(),
                record.outcome_count(),
                liquidity,
            )?;
            info!(%market, liquidity = %liquidity, "pool registered");
            ex.pools.insert(market, pool);
            Ok(())
        })
    }

    /// Request resolution from the market's oracle. Returns whether the
    /// oracle already has an answer.
    pub fn request_resolution(&mut self, market: MarketId, now: u64) -> Result<bool> {
        self.transact(market, |ex| {
            ex.registry.request_resolution(&market, now, &mut ex.oracles)
        })
    }

    /// Store the oracle's answer and close the market for good.
    pub fn finalize(&mut self, market: MarketId) -> Result<Resolution> {
        self.transact(market, |ex| ex.registry.finalize(&market, &ex.oracles))
    }

    // ========================================================================
    // Liquidity
    // ========================================================================

    /// Deposit collateral into a market's pool for LP shares.
    pub fn add_liquidity(
        &mut self,
        provider: AccountId,
        market: MarketId,
        amount: u128,
        min_shares: u128,
        now: u64,
    ) -> Result<u128> {
        self.transact(market, |ex| {
            ex.registry.ensure_open(&market, now)?;
            let initial = ex.config.initial_lp_shares;
            let pool = ex.pools.get(&market).ok_or(Error::PoolNotFound(market))?;
            let asset = pool.collateral_asset();
            let shares = pool.quote_add_liquidity(amount, initial)?;
            if shares == 0 {
                return Err(Error::ZeroOutput);
            }
            if shares < min_shares {
                return Err(Error::SlippageExceeded {
                    actual: shares,
                    minimum: min_shares,
                });
            }
            ex.require_collateral(asset, provider, amount)?;

            ex.pool_mut(&market)?.apply_add_liquidity(provider, amount, shares)?;
            ex.registry.vault_mut().deposit(market, amount)?;
            let custody = ex.config.custody;
            ex.settle(&[Step::Move {
                asset,
                from: provider,
                to: custody,
                amount,
            }])?;

            info!(%market, %provider, amount, shares, "liquidity added");
            Ok(shares)
        })
    }

    /// Burn LP shares for a pro-rata part of withdrawable collateral and of
    /// the pool's outcome-token position. Allowed in every market state.
    ///
    /// Before resolution the tokens include the provider's part of the
    /// liability reserve, paid out as outcome tokens (see [`Pool`]).
    ///
    /// `min_outcomes` holds one minimum per outcome.
    pub fn remove_liquidity(
        &mut self,
        provider: AccountId,
        market: MarketId,
        shares: u128,
        min_collateral: u128,
        min_outcomes: &[u128],
    ) -> Result<LiquidityWithdrawal> {
        self.transact(market, |ex| {
            let exposure = ex.registry.market(&market)?.exposure();
            let pool = ex.pools.get(&market).ok_or(Error::PoolNotFound(market))?;
            if min_outcomes.len() != pool.outcome_count() {
                return Err(Error::LengthMismatch {
                    expected: pool.outcome_count(),
                    actual: min_outcomes.len(),
                });
            }
            let asset = pool.collateral_asset();
            let withdrawal = pool.quote_remove_liquidity(&provider, shares, exposure)?;
            if withdrawal.collateral < min_collateral {
                return Err(Error::SlippageExceeded {
                    actual: withdrawal.collateral,
                    minimum: min_collateral,
                });
            }
            for (&actual, &minimum) in withdrawal.tokens.iter().zip(min_outcomes) {
                if actual < minimum {
                    return Err(Error::SlippageExceeded { actual, minimum });
                }
            }

            ex.pool_mut(&market)?.apply_remove_liquidity(provider, &withdrawal)?;
            ex.registry.vault_mut().withdraw(market, withdrawal.collateral)?;

            let mut steps = Vec::with_capacity(withdrawal.tokens.len() + 1);
            if withdrawal.collateral > 0 {
                steps.push(Step::Move {
                    asset,
                    from: ex.config.custody,
                    to: provider,
                    amount: withdrawal.collateral,
                });
            }
            for (index, &amount) in withdrawal.tokens.iter().enumerate() {
                if amount > 0 {
                    steps.push(Step::Mint {
                        to: provider,
                        token: TokenId::new(market, index as u8),
                        amount,
                    });
                }
            }
            ex.settle(&steps)?;

            info!(
                %market,
                %provider,
                shares,
                collateral = withdrawal.collateral,
                "liquidity removed"
            );
            Ok(withdrawal)
        })
    }

    // ========================================================================
    // Trading
    // ========================================================================

    /// Spend `amount` collateral on outcome `outcome`.
    pub fn buy(
        &mut self,
        trader: AccountId,
        market: MarketId,
        outcome: u8,
        amount: u128,
        min_tokens: u128,
        now: u64,
    ) -> Result<Trade> {
        self.transact(market, |ex| {
            let quote = ex.quote_buy(&market, outcome, amount, now)?;
            if quote.tokens < min_tokens {
                return Err(Error::SlippageExceeded {
                    actual: quote.tokens,
                    minimum: min_tokens,
                });
            }
            let asset = ex.pool(&market)?.collateral_asset();
            ex.require_collateral(asset, trader, amount)?;

            ex.pool_mut(&market)?.apply_buy(&quote)?;
            ex.registry.vault_mut().deposit(market, amount)?;
            let custody = ex.config.custody;
            ex.settle(&[
                Step::Move {
                    asset,
                    from: trader,
                    to: custody,
                    amount,
                },
                Step::Mint {
                    to: trader,
                    token: TokenId::new(market, outcome),
                    amount: quote.tokens,
                },
            ])?;

            let trade = ex.next_trade(market, Side::Buy, trader, &quote, now);
            debug!(
                %market,
                %trader,
                outcome,
                tokens = quote.tokens,
                collateral = amount,
                "buy"
            );
            Ok(trade)
        })
    }

    /// Sell `tokens` of outcome `outcome` back to the pool.
    pub fn sell(
        &mut self,
        trader: AccountId,
        market: MarketId,
        outcome: u8,
        tokens: u128,
        min_collateral: u128,
        now: u64,
    ) -> Result<Trade> {
        self.transact(market, |ex| {
            let quote = ex.quote_sell(&market, outcome, tokens, now)?;
            if quote.collateral < min_collateral {
                return Err(Error::SlippageExceeded {
                    actual: quote.collateral,
                    minimum: min_collateral,
                });
            }
            let token = TokenId::new(market, outcome);
            ex.require_tokens(trader, token, tokens)?;
            let asset = ex.pool(&market)?.collateral_asset();

            ex.pool_mut(&market)?.apply_sell(&quote)?;
            ex.registry.vault_mut().withdraw(market, quote.collateral)?;
            let mut steps = vec![Step::Burn {
                from: trader,
                token,
                amount: tokens,
            }];
            if quote.collateral > 0 {
                steps.push(Step::Move {
                    asset,
                    from: ex.config.custody,
                    to: trader,
                    amount: quote.collateral,
                });
            }
            ex.settle(&steps)?;

            let trade = ex.next_trade(market, Side::Sell, trader, &quote, now);
            debug!(
                %market,
                %trader,
                outcome,
                tokens,
                collateral = quote.collateral,
                "sell"
            );
            Ok(trade)
        })
    }

    // ========================================================================
    // Complete sets
    // ========================================================================

    /// Lock `amount` collateral and mint `amount` of every outcome token.
    pub fn split_position(
        &mut self,
        account: AccountId,
        market: MarketId,
        amount: u128,
        now: u64,
    ) -> Result<()> {
        self.transact(market, |ex| {
            let record = ex.registry.ensure_open(&market, now)?;
            let asset = record.config().collateral();
            let outcomes = record.outcome_count();
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            ex.require_collateral(asset, account, amount)?;

            ex.registry.vault_mut().deposit(market, amount)?;
            let mut steps = vec![Step::Move {
                asset,
                from: account,
                to: ex.config.custody,
                amount,
            }];
            steps.extend((0..outcomes).map(|index| Step::Mint {
                to: account,
                token: TokenId::new(market, index),
                amount,
            }));
            ex.settle(&steps)?;

            debug!(%market, %account, amount, "position split");
            Ok(())
        })
    }

    /// Burn `amount` of every outcome token and release `amount` collateral.
    pub fn merge_positions(&mut self, account: AccountId, market: MarketId, amount: u128) -> Result<()> {
        self.transact(market, |ex| {
            let record = ex.registry.market(&market)?;
            if record.status() == MarketStatus::Resolved {
                return Err(Error::AlreadyResolved(market));
            }
            let asset = record.config().collateral();
            let outcomes = record.outcome_count();
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            for index in 0..outcomes {
                ex.require_tokens(account, TokenId::new(market, index), amount)?;
            }

            ex.registry.vault_mut().withdraw(market, amount)?;
            let mut steps: Vec<Step> = (0..outcomes)
                .map(|index| Step::Burn {
                    from: account,
                    token: TokenId::new(market, index),
                    amount,
                })
                .collect();
            steps.push(Step::Move {
                asset,
                from: ex.config.custody,
                to: account,
                amount,
            });
            ex.settle(&steps)?;

            debug!(%market, %account, amount, "positions merged");
            Ok(())
        })
    }

    // ========================================================================
    // Redemption
    // ========================================================================

    /// Burn `amount` tokens of `outcome` for the same amount of collateral.
    pub fn redeem(
        &mut self,
        holder: AccountId,
        market: MarketId,
        outcome: u8,
        amount: u128,
    ) -> Result<u128> {
        self.transact(market, |ex| {
            let asset = ex
                .registry
                .authorize_redemption(&market, outcome)?
                .config()
                .collateral();
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            let token = TokenId::new(market, outcome);
            ex.require_tokens(holder, token, amount)?;

            ex.registry.vault_mut().withdraw(market, amount)?;
            let custody = ex.config.custody;
            ex.settle(&[
                Step::Burn {
                    from: holder,
                    token,
                    amount,
                },
                Step::Move {
                    asset,
                    from: custody,
                    to: holder,
                    amount,
                },
            ])?;

            info!(%market, %holder, outcome, amount, "redeemed");
            Ok(amount)
        })
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    #[inline]
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn market(&self, market: &MarketId) -> Result<&Market> {
        self.registry.market(market)
    }

    pub fn status(&self, market: &MarketId) -> Result<MarketStatus> {
        Ok(self.registry.market(market)?.status())
    }

    pub fn is_open(&self, market: &MarketId, now: u64) -> Result<bool> {
        self.registry.is_open(market, now)
    }

    /// Markets in creation order
    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.registry.iter()
    }

    pub fn pool(&self, market: &MarketId) -> Result<&Pool> {
        self.pools.get(market).ok_or(Error::PoolNotFound(*market))
    }

    pub fn prices(&self, market: &MarketId) -> Result<Vec<Fixed>> {
        self.pool(market)?.prices()
    }

    /// What [`Exchange::buy`] would mint for `amount`, without executing
    pub fn quote_buy(&self, market: &MarketId, outcome: u8, amount: u128, now: u64) -> Result<Quote> {
        self.registry.ensure_open(market, now)?.check_outcome(outcome)?;
        self.pool(market)?
            .quote_buy(outcome, amount, self.config.max_bracket_doublings)
    }

    /// What [`Exchange::sell`] would pay for `tokens`, without executing
    pub fn quote_sell(&self, market: &MarketId, outcome: u8, tokens: u128, now: u64) -> Result<Quote> {
        self.registry.ensure_open(market, now)?.check_outcome(outcome)?;
        self.pool(market)?.quote_sell(outcome, tokens)
    }

    pub fn lp_shares(&self, market: &MarketId, provider: &AccountId) -> u128 {
        self.pools
            .get(market)
            .map(|pool| pool.shares_of(provider))
            .unwrap_or(0)
    }

    pub fn outcome_balance(&self, account: AccountId, token: TokenId) -> u128 {
        self.ledger.balance_of(account, token)
    }

    pub fn collateral_balance(&self, asset: AssetId, account: AccountId) -> u128 {
        self.collateral.balance_of(asset, account)
    }

    pub fn vault_balance(&self, market: &MarketId) -> u128 {
        self.registry.vault().balance(*market)
    }

    #[inline]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[inline]
    pub fn collateral(&self) -> &C {
        &self.collateral
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn trade_count(&self) -> u64 {
        self.trades
    }

    /// SHA-256 over every market, its vault balance and its pool, in
    /// creation order
    pub fn state_root(&self) -> [u8; 32] {
        let mut buf = Vec::new();
        for market in self.registry.iter() {
            market.encode_state(&mut buf);
            buf.extend_from_slice(&self.registry.vault().balance(market.id()).to_le_bytes());
            match self.pools.get(&market.id()) {
                Some(pool) => {
                    buf.push(1);
                    pool.encode_state(&mut buf);
                }
                None => buf.push(0),
            }
        }
        Checkpoint::compute_hash(&buf)
    }

    pub fn checkpoint(&self, now: u64) -> Checkpoint {
        Checkpoint::new(
            self.sequence,
            self.registry.len() as u64,
            self.trades,
            self.state_root(),
            now,
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{CollateralBook, OutcomeBook};
    use crate::oracle::ManualOracle;
    use crate::types::{MarketFlags, OracleId, QuestionId};

    type TestExchange = Exchange<OutcomeBook, CollateralBook>;

    fn usdc() -> AssetId {
        AssetId::derive(b"usdc")
    }

    fn alice() -> AccountId {
        AccountId::derive(b"alice")
    }

    fn setup() -> (TestExchange, MarketId) {
        let oracle_id = OracleId::derive(b"oracle");
        let mut collateral = CollateralBook::new();
        collateral.credit(usdc(), alice(), 10_000_000_000).unwrap();
        let oracles = OracleSet::new().with(oracle_id, ManualOracle::new());
        let mut exchange =
            Exchange::new(ExchangeConfig::default(), OutcomeBook::new(), collateral, oracles).unwrap();
        let config = MarketConfig::new(
            usdc(),
            1_000,
            MarketFlags::NONE,
            2,
            oracle_id,
            QuestionId::derive(b"q"),
        );
        let market = exchange.create_market(config).unwrap();
        exchange
            .register_amm(market, Fixed::from_raw(1_000_000_000), 0)
            .unwrap();
        (exchange, market)
    }

    #[test]
    fn test_nested_call_is_rejected() {
        let (mut exchange, market) = setup();
        let result = exchange.transact(market, |ex| {
            ex.add_liquidity(alice(), market, 1_000, 0, 0)
        });
        assert_eq!(result, Err(Error::Reentrancy(market)));
        assert!(exchange.locks.is_idle());
        assert_eq!(exchange.vault_balance(&market), 0);
    }

    #[test]
    fn test_failed_operation_restores_state() {
        let (mut exchange, market) = setup();
        exchange.add_liquidity(alice(), market, 1_000_000_000, 0, 0).unwrap();
        let root = exchange.state_root();
        let sequence = exchange.sequence();

        let result: Result<()> = exchange.transact(market, |ex| {
            let quote = ex.quote_buy(&market, 0, 100_000, 0)?;
            ex.pool_mut(&market)?.apply_buy(&quote)?;
            ex.registry.vault_mut().deposit(market, 100_000)?;
            Err(Error::ZeroOutput)
        });
        assert_eq!(result, Err(Error::ZeroOutput));
        assert_eq!(exchange.state_root(), root);
        assert_eq!(exchange.sequence(), sequence);
    }

    #[test]
    fn test_settle_reverses_earlier_steps() {
        let (mut exchange, market) = setup();
        let custody = exchange.config().custody;
        let before = exchange.collateral_balance(usdc(), alice());
        // The burn fails: alice holds no outcome tokens
        let result = exchange.settle(&[
            Step::Move {
                asset: usdc(),
                from: alice(),
                to: custody,
                amount: 500,
            },
            Step::Burn {
                from: alice(),
                token: TokenId::new(market, 0),
                amount: 1,
            },
        ]);
        assert!(matches!(result, Err(Error::Ledger(_))));
        assert_eq!(exchange.collateral_balance(usdc(), alice()), before);
        assert_eq!(exchange.collateral_balance(usdc(), custody), 0);
    }

    #[test]
    fn test_pool_registration_rules() {
        let (mut exchange, market) = setup();
        assert_eq!(
            exchange.register_amm(market, Fixed::ONE, 0),
            Err(Error::PoolExists(market))
        );
        let unknown = MarketId::derive(b"nope");
        assert_eq!(
            exchange.register_amm(unknown, Fixed::ONE, 0),
            Err(Error::MarketNotFound(unknown))
        );
        assert_eq!(exchange.pool(&unknown).err(), Some(Error::PoolNotFound(unknown)));
    }

    #[test]
    fn test_trade_ids_increase() {
        let (mut exchange, market) = setup();
        exchange.add_liquidity(alice(), market, 1_000_000_000, 0, 0).unwrap();
        let first = exchange.buy(alice(), market, 0, 1_000_000, 0, 1).unwrap();
        let second = exchange.buy(alice(), market, 1, 1_000_000, 0, 2).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(exchange.trade_count(), 2);
        assert_eq!(exchange.checkpoint(3).trades, 2);
    }
}
