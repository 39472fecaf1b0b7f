//! Token ledgers consumed by the exchange.
//!
//! The exchange never stores balances itself. Outcome tokens live in a
//! [`TokenLedger`] keyed by [`TokenId`]; collateral lives in a
//! [`CollateralAsset`] ledger keyed by asset. Both are injected at
//! construction.
//!
//! [`OutcomeBook`] and [`CollateralBook`] are in-memory implementations used
//! by the demo binary, tests and benchmarks.

mod memory;

pub use memory::{CollateralBook, OutcomeBook};

use thiserror::Error;

use crate::types::{AccountId, AssetId, TokenId};

/// Failure reported by a ledger. Ledgers leave balances untouched on error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account {account} holds {available}, needs {required}")]
    InsufficientBalance {
        account: AccountId,
        available: u128,
        required: u128,
    },

    #[error("balance overflow for account {account}")]
    Overflow { account: AccountId },
}

/// Multi-token ledger for outcome tokens.
pub trait TokenLedger {
    fn mint(&mut self, to: AccountId, token: TokenId, amount: u128) -> Result<(), LedgerError>;

    fn burn(&mut self, from: AccountId, token: TokenId, amount: u128) -> Result<(), LedgerError>;

    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        token: TokenId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    fn balance_of(&self, account: AccountId, token: TokenId) -> u128;
}

/// Fungible collateral tokens, one balance sheet per asset.
pub trait CollateralAsset {
    fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    fn balance_of(&self, asset: AssetId, account: AccountId) -> u128;
}
