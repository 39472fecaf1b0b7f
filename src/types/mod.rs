//! Core data types for the LMSR market exchange
//!
//! Records that are hashed (market configurations, trades, checkpoints)
//! implement SSZ serialization for deterministic encoding.
//!
//! ## Types
//!
//! - [`Fixed`]: signed fixed-point number scaled by 10^18
//! - [`MarketConfig`]: immutable market configuration, hashed into [`MarketId`]
//! - [`MarketStatus`]: Open, Resolvable or Resolved
//! - [`TokenId`]: one outcome of one market
//! - [`Trade`]: an executed buy or sell
//! - [`Checkpoint`]: state root plus counters
//!
//! ## Amounts
//!
//! Collateral, outcome tokens and LP shares are `u128` base units. The
//! pricing engine reads an amount `a` as `Fixed::from_raw(a)`.

pub mod fixed;
mod ids;
mod market;
mod receipt;
mod trade;

// Re-export all types at module level
pub use fixed::{Fixed, WAD};
pub use ids::{AccountId, AssetId, MarketId, OracleId, QuestionId, TokenId, TOKEN_KEY_LEN};
pub use market::{
    MarketConfig, MarketFlags, MarketStatus, Resolution, CONFIG_ENCODED_LEN, MAX_OUTCOMES,
    MIN_OUTCOMES,
};
pub use receipt::Checkpoint;
pub use trade::{Side, Trade};
