//! Trade record returned by every executed buy or sell.
//!
//! ## SSZ Serialization
//!
//! Trades are serialized using SSZ so a trade log hashes identically on
//! every replay.

use ssz_rs::prelude::*;

use crate::types::ids::{AccountId, MarketId, TokenId};

// ============================================================================
// Side enum
// ============================================================================

/// Trade direction, from the trader's point of view
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Collateral in, outcome tokens out
    #[default]
    Buy,
    /// Outcome tokens in, collateral out
    Sell,
}

impl Side {
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }
}

// ============================================================================
// Trade struct
// ============================================================================

/// A single trade against a market's pool.
///
/// ## Example
///
/// ```
/// use lmsr_markets::types::{AccountId, MarketId, Side, Trade};
///
/// let trade = Trade::new(
///     1,                              // sequence number
///     MarketId::derive(b"market"),
///     0,                              // outcome index
///     Side::Buy,
///     AccountId::derive(b"alice"),
///     190_000_000,                    // outcome tokens
///     100_000_000,                    // collateral
///     1_700_000_000,                  // timestamp (seconds)
/// );
/// assert_eq!(trade.side(), Some(Side::Buy));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Trade {
    /// Exchange-wide trade sequence number
    pub id: u64,

    pub market_raw: [u8; 32],

    pub outcome: u8,

    /// Side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    pub trader_raw: [u8; 32],

    /// Outcome tokens minted (buy) or burned (sell)
    pub tokens: u128,

    /// Collateral paid in (buy) or out (sell)
    pub collateral: u128,

    /// Execution time in seconds
    pub timestamp: u64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        market: MarketId,
        outcome: u8,
        side: Side,
        trader: AccountId,
        tokens: u128,
        collateral: u128,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            market_raw: *market.as_bytes(),
            outcome,
            side_raw: side.to_u8(),
            trader_raw: *trader.as_bytes(),
            tokens,
            collateral,
            timestamp,
        }
    }

    #[inline]
    pub fn market(&self) -> MarketId {
        MarketId::new(self.market_raw)
    }

    #[inline]
    pub fn side(&self) -> Option<Side> {
        Side::from_u8(self.side_raw)
    }

    #[inline]
    pub fn trader(&self) -> AccountId {
        AccountId::new(self.trader_raw)
    }

    #[inline]
    pub fn token(&self) -> TokenId {
        TokenId::new(self.market(), self.outcome)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
