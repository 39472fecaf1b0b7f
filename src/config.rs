//! Exchange configuration.
//!
//! Fixed when the exchange is built; nothing can change it afterwards.
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```
//! use lmsr_markets::config::ExchangeConfig;
//!
//! let config = ExchangeConfig::from_json(r#"{ "max_bracket_doublings": 64 }"#).unwrap();
//! assert_eq!(config.max_bracket_doublings, 64);
//! assert_eq!(config.initial_lp_shares, ExchangeConfig::default().initial_lp_shares);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{AccountId, WAD};

/// Label hashed into the default custody account
pub const DEFAULT_CUSTODY_LABEL: &[u8] = b"lmsr-markets/custody";

/// Shares minted for a pool's first deposit: 1000 * 10^18
pub const DEFAULT_INITIAL_LP_SHARES: u128 = 1_000 * WAD as u128;

/// Bracket doublings allowed when sizing a buy
pub const DEFAULT_MAX_BRACKET_DOUBLINGS: u32 = 96;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Collateral ledger account holding every market's vault
    pub custody: AccountId,

    /// LP shares minted for the first deposit into a pool
    pub initial_lp_shares: u128,

    /// Upper bound on bracket doublings in the buy solver
    pub max_bracket_doublings: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            custody: AccountId::derive(DEFAULT_CUSTODY_LABEL),
            initial_lp_shares: DEFAULT_INITIAL_LP_SHARES,
            max_bracket_doublings: DEFAULT_MAX_BRACKET_DOUBLINGS,
        }
    }
}

impl ExchangeConfig {
    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::Encoding(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.custody.is_zero() {
            return Err(Error::ZeroAddress("custody account"));
        }
        if self.initial_lp_shares == 0 {
            return Err(Error::InvalidConfig("initial_lp_shares must be positive"));
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
