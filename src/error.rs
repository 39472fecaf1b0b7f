//! Error types for the exchange.
//!
//! Every rejection is atomic: the operation that returned the error left no
//! trace in pool, vault, registry or ledger state. Callers retry with
//! adjusted input or once a precondition holds (deadline passed, oracle
//! answered).

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::math::MathError;
use crate::oracle::OracleError;
use crate::types::{MarketId, MarketStatus};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of an [`Error`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Market state does not allow the operation
    StatePrecondition,
    /// Slippage, solvency or amount checks failed
    Economic,
    /// Token ledger or oracle rejected the call or has no answer yet
    Collaborator,
    /// A required reference or parameter was zero or unknown
    Configuration,
    /// Fixed-point overflow or domain error
    Arithmetic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // ------------------------------------------------------------------------
    // State preconditions
    // ------------------------------------------------------------------------
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    #[error("no pool registered for market {0}")]
    PoolNotFound(MarketId),

    #[error("market {0} already exists")]
    MarketExists(MarketId),

    #[error("pool for market {0} already registered")]
    PoolExists(MarketId),

    #[error("market {market} is not open for trading (status {status})")]
    MarketNotOpen { market: MarketId, status: MarketStatus },

    #[error("market {0} is not resolvable")]
    NotResolvable(MarketId),

    #[error("market {0} is already resolved")]
    AlreadyResolved(MarketId),

    #[error("market {0} is not resolved")]
    NotResolved(MarketId),

    #[error("market {market} deadline {deadline} not reached (now {now})")]
    DeadlineNotReached { market: MarketId, deadline: u64, now: u64 },

    #[error("outcome {outcome} out of range for {count} outcomes")]
    OutcomeOutOfRange { outcome: u8, count: u8 },

    #[error("outcome count {0} outside 2..=8")]
    OutcomeCountOutOfRange(u8),

    #[error("outcome {outcome} did not win (winner {winner})")]
    NotWinningOutcome { outcome: u8, winner: u8 },

    #[error("market {0} resolved invalid without refunds")]
    InvalidWithoutRefund(MarketId),

    #[error("market {0} is already inside a state-changing call")]
    Reentrancy(MarketId),

    // ------------------------------------------------------------------------
    // Economic
    // ------------------------------------------------------------------------
    #[error("slippage: got {actual}, minimum {minimum}")]
    SlippageExceeded { actual: u128, minimum: u128 },

    #[error("pool collateral {available} cannot cover {required}")]
    InsufficientPoolCollateral { available: u128, required: u128 },

    #[error("liquidity shares {available} below {required}")]
    InsufficientShares { available: u128, required: u128 },

    #[error("vault for market {market} holds {available}, needs {required}")]
    InsufficientVault { market: MarketId, available: u128, required: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("trade produces zero output")]
    ZeroOutput,

    #[error("expected {expected} entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("market {0} has no liquidity")]
    NoLiquidity(MarketId),

    #[error("no bracket found for a buy of {0}")]
    QuoteOutOfRange(u128),

    // ------------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------------
    #[error("oracle has not resolved the question")]
    OracleNotResolved,

    #[error("oracle reported winning outcome {outcome} for {count} outcomes")]
    InvalidOracleReport { outcome: u8, count: u8 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------
    #[error("liquidity parameter must be positive")]
    ZeroLiquidityParameter,

    #[error("{0} must not be the zero id")]
    ZeroAddress(&'static str),

    #[error("oracle {0} is not registered")]
    UnknownOracle(String),

    #[error("invalid exchange configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("encoding failed: {0}")]
    Encoding(String),

    // ------------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------------
    #[error(transparent)]
    Math(#[from] MathError),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        use Error::*;
        match self {
            MarketNotFound(_)
            | PoolNotFound(_)
            | MarketExists(_)
            | PoolExists(_)
            | MarketNotOpen { .. }
            | NotResolvable(_)
            | AlreadyResolved(_)
            | NotResolved(_)
            | DeadlineNotReached { .. }
            | OutcomeOutOfRange { .. }
            | OutcomeCountOutOfRange(_)
            | NotWinningOutcome { .. }
            | InvalidWithoutRefund(_)
            | Reentrancy(_) => ErrorCategory::StatePrecondition,

            SlippageExceeded { .. }
            | InsufficientPoolCollateral { .. }
            | InsufficientShares { .. }
            | InsufficientVault { .. }
            | ZeroAmount
            | ZeroOutput
            | LengthMismatch { .. }
            | NoLiquidity(_)
            | QuoteOutOfRange(_) => ErrorCategory::Economic,

            OracleNotResolved | InvalidOracleReport { .. } | Ledger(_) | Oracle(_) => {
                ErrorCategory::Collaborator
            }

            ZeroLiquidityParameter
            | ZeroAddress(_)
            | UnknownOracle(_)
            | InvalidConfig(_)
            | Encoding(_) => ErrorCategory::Configuration,

            Math(_) => ErrorCategory::Arithmetic,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
