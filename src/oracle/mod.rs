//! Outcome oracles.
//!
//! The registry depends only on [`OutcomeOracle`]. Concrete adapters (a
//! manually answered oracle here, price-average oracles elsewhere) plug in
//! behind it and are collected into an [`OracleSet`] once, when the exchange
//! is built. The set has no way to add or replace an oracle afterwards.
//!
//! ## Contract
//!
//! - `request_resolution` is a permissionless, idempotent trigger.
//! - `outcome` is a pure query. It reports `resolved = false` until an answer
//!   exists, after which every field is fixed forever.

mod manual;

pub use manual::ManualOracle;

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::types::{OracleId, QuestionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("question {0} already answered")]
    AlreadyAnswered(QuestionId),

    #[error("oracle rejected the request: {0}")]
    Rejected(String),
}

/// Answer to a question, as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OracleReport {
    pub winning_outcome: u8,
    pub invalid: bool,
    pub resolved: bool,
    pub resolved_at: u64,
}

impl OracleReport {
    /// Report for a question without an answer yet
    pub const fn pending() -> Self {
        Self {
            winning_outcome: 0,
            invalid: false,
            resolved: false,
            resolved_at: 0,
        }
    }
}

/// Oracle capability consumed by the market registry.
pub trait OutcomeOracle {
    /// Ask the oracle to start answering `question`. Safe to repeat.
    fn request_resolution(&mut self, question: QuestionId) -> Result<(), OracleError>;

    /// Current answer for `question`
    fn outcome(&self, question: QuestionId) -> Result<OracleReport, OracleError>;
}

// ============================================================================
// OracleSet
// ============================================================================

/// Oracles known to the exchange, keyed by [`OracleId`].
#[derive(Default)]
pub struct OracleSet {
    oracles: HashMap<OracleId, Box<dyn OutcomeOracle>>,
}

impl OracleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an oracle while building the set
    pub fn with(mut self, id: OracleId, oracle: impl OutcomeOracle + 'static) -> Self {
        self.oracles.insert(id, Box::new(oracle));
        self
    }

    pub fn contains(&self, id: &OracleId) -> bool {
        self.oracles.contains_key(id)
    }

    pub fn get(&self, id: &OracleId) -> Option<&dyn OutcomeOracle> {
        self.oracles.get(id).map(|oracle| oracle.as_ref())
    }

    pub fn get_mut(&mut self, id: &OracleId) -> Option<&mut (dyn OutcomeOracle + 'static)> {
        self.oracles.get_mut(id).map(|oracle| oracle.as_mut())
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }
}

impl fmt::Debug for OracleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.oracles.keys().collect();
        ids.sort();
        f.debug_struct("OracleSet").field("oracles", &ids).finish()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_lookup() {
        let id = OracleId::derive(b"manual");
        let set = OracleSet::new().with(id, ManualOracle::new());
        assert!(set.contains(&id));
        assert!(!set.contains(&OracleId::derive(b"other")));
        assert!(set.get(&id).is_some());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_dispatches_to_shared_handle() {
        let id = OracleId::derive(b"manual");
        let handle = ManualOracle::new();
        let mut set = OracleSet::new().with(id, handle.clone());
        let question = QuestionId::derive(b"q");

        set.get_mut(&id).unwrap().request_resolution(question).unwrap();
        assert!(handle.is_requested(question));

        handle.resolve(question, 1, false, 99).unwrap();
        let report = set.get(&id).unwrap().outcome(question).unwrap();
        assert!(report.resolved);
        assert_eq!(report.winning_outcome, 1);
    }

    #[test]
    fn test_pending_report() {
        let report = OracleReport::pending();
        assert!(!report.resolved);
        assert_eq!(report, OracleReport::default());
    }
}
