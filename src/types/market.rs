//! Market configuration, lifecycle status and resolution record.
//!
//! ## SSZ Serialization
//!
//! [`MarketConfig`] derives `SimpleSerialize`. Its encoding is the canonical
//! form hashed into the market id, so the field order and widths below are
//! fixed:
//!
//! | Field | Bytes |
//! |-------|-------|
//! | `collateral_raw` | 32 |
//! | `deadline` | 8 (little-endian) |
//! | `flags` | 1 |
//! | `outcome_count` | 1 |
//! | `oracle_raw` | 32 |
//! | `question_raw` | 32 |
//!
//! Total: 106 bytes.

use std::fmt;
use std::ops::BitOr;

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::error::{Error, Result};
use crate::types::ids::{AssetId, MarketId, OracleId, QuestionId};

/// Smallest supported number of outcomes
pub const MIN_OUTCOMES: u8 = 2;

/// Largest supported number of outcomes
pub const MAX_OUTCOMES: u8 = 8;

/// Size of the canonical configuration encoding
pub const CONFIG_ENCODED_LEN: usize = 106;

// ============================================================================
// MarketFlags
// ============================================================================

/// Behaviour flags fixed at market creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MarketFlags(u8);

impl MarketFlags {
    pub const NONE: MarketFlags = MarketFlags(0);

    /// Resolution may be requested before the deadline
    pub const EARLY_RESOLUTION: MarketFlags = MarketFlags(0b01);

    /// An invalid market refunds every outcome token 1:1
    pub const INVALID_REFUNDS: MarketFlags = MarketFlags(0b10);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn contains(self, other: MarketFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MarketFlags {
    type Output = MarketFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        MarketFlags(self.0 | rhs.0)
    }
}

// ============================================================================
// MarketConfig
// ============================================================================

/// Immutable market configuration.
///
/// Ids are stored as raw byte arrays for SSZ; use the typed accessors.
///
/// ## Example
///
/// ```
/// use lmsr_markets::types::{AssetId, MarketConfig, MarketFlags, OracleId, QuestionId};
///
/// let config = MarketConfig::new(
///     AssetId::derive(b"usdc"),
///     1_700_000_000,                 // deadline (seconds)
///     MarketFlags::INVALID_REFUNDS,
///     3,                             // outcome count
///     OracleId::derive(b"oracle"),
///     QuestionId::derive(b"who wins"),
/// );
/// let id = config.market_id().unwrap();
/// assert_eq!(id, config.clone().market_id().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct MarketConfig {
    /// Collateral asset id
    pub collateral_raw: [u8; 32],

    /// Trading deadline in seconds
    pub deadline: u64,

    /// [`MarketFlags`] bits
    pub flags: u8,

    /// Number of outcomes, 2 to 8
    pub outcome_count: u8,

    /// Oracle id
    pub oracle_raw: [u8; 32],

    /// Question id, scoped to the oracle
    pub question_raw: [u8; 32],
}

impl MarketConfig {
    /// Create a configuration
    ///
    /// # Arguments
    ///
    /// * `collateral` - Collateral asset backing the outcome tokens
    /// * `deadline` - Trading closes at this time (seconds)
    /// * `flags` - Behaviour flags
    /// * `outcome_count` - Number of outcomes
    /// * `oracle` - Oracle that answers `question`
    /// * `question` - The proposition the market resolves on
    pub fn new(
        collateral: AssetId,
        deadline: u64,
        flags: MarketFlags,
        outcome_count: u8,
        oracle: OracleId,
        question: QuestionId,
    ) -> Self {
        Self {
            collateral_raw: *collateral.as_bytes(),
            deadline,
            flags: flags.bits(),
            outcome_count,
            oracle_raw: *oracle.as_bytes(),
            question_raw: *question.as_bytes(),
        }
    }

    #[inline]
    pub fn collateral(&self) -> AssetId {
        AssetId::new(self.collateral_raw)
    }

    #[inline]
    pub fn oracle(&self) -> OracleId {
        OracleId::new(self.oracle_raw)
    }

    #[inline]
    pub fn question(&self) -> QuestionId {
        QuestionId::new(self.question_raw)
    }

    #[inline]
    pub fn flags(&self) -> MarketFlags {
        MarketFlags::from_bits(self.flags)
    }

    #[inline]
    pub fn early_resolution(&self) -> bool {
        self.flags().contains(MarketFlags::EARLY_RESOLUTION)
    }

    #[inline]
    pub fn invalid_refunds(&self) -> bool {
        self.flags().contains(MarketFlags::INVALID_REFUNDS)
    }

    /// Canonical SSZ encoding
    pub fn encode(&self) -> Result<Vec<u8>> {
        ssz_rs::serialize(self).map_err(|e| Error::Encoding(e.to_string()))
    }

    /// SHA-256 of the canonical encoding
    pub fn market_id(&self) -> Result<MarketId> {
        let bytes = self.encode()?;
        Ok(MarketId::new(Sha256::digest(&bytes).into()))
    }
}

// ============================================================================
// MarketStatus
// ============================================================================

/// Lifecycle status. Only ever moves forward.
///
/// Represented as u8 for hashing:
/// - Open = 0
/// - Resolvable = 1
/// - Resolved = 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MarketStatus {
    /// Trading and liquidity operations permitted until the deadline
    #[default]
    Open,
    /// Resolution requested, waiting for the oracle answer
    Resolvable,
    /// Terminal, resolution fields fixed
    Resolved,
}

impl MarketStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            MarketStatus::Open => 0,
            MarketStatus::Resolvable => 1,
            MarketStatus::Resolved => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MarketStatus::Open),
            1 => Some(MarketStatus::Resolvable),
            2 => Some(MarketStatus::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketStatus::Open => "open",
            MarketStatus::Resolvable => "resolvable",
            MarketStatus::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// Outcome of a finalized market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Winning outcome index; meaningless when `invalid`
    pub winning_outcome: u8,

    /// The oracle declared the question unanswerable
    pub invalid: bool,

    /// Oracle resolution time (seconds)
    pub resolved_at: u64,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MarketConfig {
        MarketConfig::new(
            AssetId::derive(b"collateral"),
            1_000,
            MarketFlags::NONE,
            2,
            OracleId::derive(b"oracle"),
            QuestionId::derive(b"question"),
        )
    }

    #[test]
    fn test_flags() {
        let both = MarketFlags::EARLY_RESOLUTION | MarketFlags::INVALID_REFUNDS;
        assert_eq!(both.bits(), 0b11);
        assert!(both.contains(MarketFlags::EARLY_RESOLUTION));
        assert!(!MarketFlags::NONE.contains(MarketFlags::INVALID_REFUNDS));
    }

    #[test]
    fn test_accessors() {
        let mut c = config();
        assert_eq!(c.collateral(), AssetId::derive(b"collateral"));
        assert_eq!(c.oracle(), OracleId::derive(b"oracle"));
        assert_eq!(c.question(), QuestionId::derive(b"question"));
        assert!(!c.early_resolution());
        c.flags = MarketFlags::INVALID_REFUNDS.bits();
        assert!(c.invalid_refunds());
        assert!(!c.early_resolution());
    }

    #[test]
    fn test_encoding_layout() {
        let c = config();
        let bytes = c.encode().unwrap();
        assert_eq!(bytes.len(), CONFIG_ENCODED_LEN);
        assert_eq!(&bytes[0..32], &c.collateral_raw);
        assert_eq!(&bytes[32..40], &1_000u64.to_le_bytes());
        assert_eq!(bytes[40], 0);
        assert_eq!(bytes[41], 2);
        assert_eq!(&bytes[42..74], &c.oracle_raw);
        assert_eq!(&bytes[74..106], &c.question_raw);
    }

    #[test]
    fn test_market_id_is_content_hash() {
        let a = config();
        let mut b = config();
        assert_eq!(a.market_id().unwrap(), b.market_id().unwrap());

        b.deadline += 1;
        assert_ne!(a.market_id().unwrap(), b.market_id().unwrap());

        let mut c = config();
        c.flags = MarketFlags::EARLY_RESOLUTION.bits();
        assert_ne!(a.market_id().unwrap(), c.market_id().unwrap());
    }

    #[test]
    fn test_ssz_roundtrip() {
        let c = config();
        let bytes = ssz_rs::serialize(&c).expect("Failed to serialize");
        let back: MarketConfig = ssz_rs::deserialize(&bytes).expect("Failed to deserialize");
        assert_eq!(back, c);
    }

    #[test]
    fn test_status_order_and_codes() {
        assert!(MarketStatus::Open < MarketStatus::Resolvable);
        assert!(MarketStatus::Resolvable < MarketStatus::Resolved);
        for status in [MarketStatus::Open, MarketStatus::Resolvable, MarketStatus::Resolved] {
            assert_eq!(MarketStatus::from_u8(status.to_u8()), Some(status));
        }
        assert_eq!(MarketStatus::from_u8(3), None);
        assert_eq!(MarketStatus::Resolvable.to_string(), "resolvable");
    }
}
