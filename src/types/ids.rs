//! 32-byte identifiers and the outcome token id.
//!
//! Every identifier in the system is an opaque 32-byte value. Accounts,
//! collateral assets, oracles and questions are supplied by callers; market
//! ids are derived from the market configuration (see
//! [`MarketConfig::market_id`](crate::types::MarketConfig::market_id)).
//!
//! ## Outcome tokens
//!
//! A [`TokenId`] names one outcome of one market. Its flat key is the 32
//! market-id bytes followed by the outcome index byte, so it can be
//! decoded back without a lookup table.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        pub struct $name(#[serde(with = "hex::serde")] [u8; 32]);

        impl $name {
            /// The all-zero id, never valid as a reference
            pub const ZERO: $name = $name([0u8; 32]);

            #[inline]
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            #[inline]
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            #[inline]
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }

            /// SHA-256 of an arbitrary label
            pub fn derive(label: &[u8]) -> Self {
                Self(Sha256::digest(label).into())
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }
    };
}

define_id!(
    /// Holder of collateral, outcome tokens and LP shares
    AccountId
);
define_id!(
    /// Collateral token identifier
    AssetId
);
define_id!(
    /// Key of an oracle registered with the exchange
    OracleId
);
define_id!(
    /// Oracle-scoped identifier of the proposition a market resolves on
    QuestionId
);
define_id!(
    /// Content hash of a market configuration
    MarketId
);

// ============================================================================
// TokenId
// ============================================================================

/// Length of the flat token key: market id bytes plus the outcome index
pub const TOKEN_KEY_LEN: usize = 33;

/// Outcome token: one outcome of one market.
///
/// ## Example
///
/// ```
/// use lmsr_markets::types::{MarketId, TokenId};
///
/// let token = TokenId::new(MarketId::new([7u8; 32]), 3);
/// let key = token.to_key();
/// assert_eq!(key[32], 3);
/// assert_eq!(TokenId::from_key(&key), token);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId {
    pub market_id: MarketId,
    pub outcome_index: u8,
}

impl TokenId {
    pub const fn new(market_id: MarketId, outcome_index: u8) -> Self {
        Self {
            market_id,
            outcome_index,
        }
    }

    /// Flat key: `market_id[0..32] || outcome_index`
    pub fn to_key(&self) -> [u8; TOKEN_KEY_LEN] {
        let mut key = [0u8; TOKEN_KEY_LEN];
        key[..32].copy_from_slice(self.market_id.as_bytes());
        key[32] = self.outcome_index;
        key
    }

    /// Inverse of [`TokenId::to_key`]
    pub fn from_key(key: &[u8; TOKEN_KEY_LEN]) -> Self {
        let mut market = [0u8; 32];
        market.copy_from_slice(&key[..32]);
        Self {
            market_id: MarketId::new(market),
            outcome_index: key[32],
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.market_id, self.outcome_index)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ids() {
        assert!(AccountId::ZERO.is_zero());
        assert!(AssetId::default().is_zero());
        assert!(!OracleId::new([1u8; 32]).is_zero());
    }

    #[test]
    fn test_derive_is_stable() {
        let a = QuestionId::derive(b"will it rain");
        let b = QuestionId::derive(b"will it rain");
        let c = QuestionId::derive(b"will it snow");
        assert_eq!(a, b);
        assert_ne!(a, c);
        // sha256("abc")
        assert_eq!(
            AccountId::derive(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_display_is_hex() {
        let id = MarketId::new([0xAB; 32]);
        let text = id.to_string();
        assert_eq!(text.len(), 64);
        assert!(text.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_serde_hex() {
        let id = AssetId::new([0x01; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_token_key_layout() {
        let mut market = [0u8; 32];
        market[0] = 0xFF;
        market[31] = 0x11;
        let token = TokenId::new(MarketId::new(market), 7);
        let key = token.to_key();
        assert_eq!(key[0], 0xFF);
        assert_eq!(key[31], 0x11);
        assert_eq!(key[32], 7);
        assert_eq!(TokenId::from_key(&key), token);
    }

    #[test]
    fn test_tokens_of_one_market_are_distinct() {
        let market = MarketId::derive(b"m");
        let keys: Vec<_> = (0..8).map(|i| TokenId::new(market, i).to_key()).collect();
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                assert_ne!(keys[i], keys[j]);
            }
        }
    }
}
