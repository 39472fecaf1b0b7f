//! Checkpoint of exchange state for replay verification.
//!
//! A checkpoint pairs the exchange's operation counters with the state root,
//! the SHA-256 of every market and pool in creation order. Two replays of the
//! same operation sequence produce byte-identical checkpoints.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

/// Snapshot summary of the whole exchange.
///
/// ## Example
///
/// ```
/// use lmsr_markets::types::Checkpoint;
///
/// let checkpoint = Checkpoint::new(
///     42,                     // operations applied
///     3,                      // markets
///     17,                     // trades executed
///     Checkpoint::compute_hash(b"state"),
///     1_700_000_000,          // timestamp (seconds)
/// );
/// assert_eq!(checkpoint.state_root_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Checkpoint {
    /// Number of state-changing operations applied so far
    pub sequence: u64,

    /// Number of markets created
    pub markets: u64,

    /// Number of trades executed
    pub trades: u64,

    /// SHA-256 over all market and pool state
    pub state_root: [u8; 32],

    /// Time the checkpoint was taken (seconds)
    pub timestamp: u64,
}

impl Checkpoint {
    pub fn new(
        sequence: u64,
        markets: u64,
        trades: u64,
        state_root: [u8; 32],
        timestamp: u64,
    ) -> Self {
        Self {
            sequence,
            markets,
            trades,
            state_root,
            timestamp,
        }
    }

    /// Compute SHA-256 hash of the given data
    pub fn compute_hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// SHA-256 of the checkpoint's own SSZ encoding
    pub fn digest(&self) -> Option<[u8; 32]> {
        ssz_rs::serialize(self)
            .ok()
            .map(|bytes| Self::compute_hash(&bytes))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
