//! # LMSR Markets
//!
//! Deterministic automated market maker for multi-outcome prediction markets,
//! priced by Hanson's Logarithmic Market Scoring Rule, with an oracle-driven
//! market lifecycle.
//!
//! ## Architecture
//!
//! Leaf first:
//! - **Math**: 18-digit fixed point with 256-bit intermediates, `exp`, `ln`
//! - **AMM**: LMSR cost, prices and trade sizing; per-market liquidity pools
//! - **Registry**: market records, the Open → Resolvable → Resolved state
//!   machine and the per-market collateral vault
//! - **Engine**: the [`Exchange`], which sequences every call atomically
//!   behind a per-market reentrancy guard
//!
//! Token balances and oracle answers live outside the crate, behind the
//! [`TokenLedger`], [`CollateralAsset`] and [`OutcomeOracle`] traits.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical call sequences produce identical state roots
//! 2. **No Floating Point**: every settlement value is an integer
//! 3. **All or nothing**: a rejected call has no effect
//! 4. **No privileged paths**: configuration and oracles are fixed at
//!    construction

// ============================================================================
// Module declarations
// ============================================================================

/// Fixed-point kernel: 256-bit mul/div, exp, ln
pub mod math;

/// Core data types: Fixed, ids, MarketConfig, Trade, Checkpoint
pub mod types;

/// Crate error type
pub mod error;

/// Exchange configuration
pub mod config;

/// Outcome token and collateral ledgers
pub mod ledger;

/// Outcome oracles
pub mod oracle;

/// LMSR pricing and liquidity pools
pub mod amm;

/// Market registry, lifecycle and vault
pub mod registry;

/// Exchange coordinator
pub mod engine;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use amm::{Exposure, LiquidityWithdrawal, Pool, Quote};
pub use config::ExchangeConfig;
pub use engine::Exchange;
pub use error::{Error, ErrorCategory, Result};
pub use ledger::{CollateralAsset, CollateralBook, LedgerError, OutcomeBook, TokenLedger};
pub use oracle::{ManualOracle, OracleError, OracleReport, OracleSet, OutcomeOracle};
pub use registry::{Market, MarketRegistry};
pub use types::{
    AccountId, AssetId, Checkpoint, Fixed, MarketConfig, MarketFlags, MarketId, MarketStatus,
    OracleId, QuestionId, Resolution, Side, TokenId, Trade,
};

/// Everything needed to build and drive an exchange
pub mod prelude {
    pub use crate::config::ExchangeConfig;
    pub use crate::engine::Exchange;
    pub use crate::error::{Error, Result};
    pub use crate::ledger::{CollateralAsset, CollateralBook, OutcomeBook, TokenLedger};
    pub use crate::oracle::{ManualOracle, OracleSet, OutcomeOracle};
    pub use crate::types::{
        AccountId, AssetId, Fixed, MarketConfig, MarketFlags, MarketId, MarketStatus, OracleId,
        QuestionId, TokenId,
    };
}
