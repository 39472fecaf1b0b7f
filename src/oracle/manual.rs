//! Manually answered oracle.
//!
//! A cloneable handle over shared state: the exchange owns one clone inside
//! its [`OracleSet`](crate::oracle::OracleSet), the operator keeps another
//! and calls [`ManualOracle::resolve`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::oracle::{OracleError, OracleReport, OutcomeOracle};
use crate::types::QuestionId;

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    requested: bool,
    report: Option<OracleReport>,
}

#[derive(Debug, Clone, Default)]
pub struct ManualOracle {
    questions: Arc<RwLock<HashMap<QuestionId, Entry>>>,
}

impl ManualOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the answer to `question`. An answer can only be given once.
    pub fn resolve(
        &self,
        question: QuestionId,
        winning_outcome: u8,
        invalid: bool,
        resolved_at: u64,
    ) -> Result<(), OracleError> {
        let mut questions = self.questions.write();
        let entry = questions.entry(question).or_default();
        if entry.report.is_some() {
            return Err(OracleError::AlreadyAnswered(question));
        }
        entry.report = Some(OracleReport {
            winning_outcome,
            invalid,
            resolved: true,
            resolved_at,
        });
        debug!(%question, winning_outcome, invalid, resolved_at, "oracle answered");
        Ok(())
    }

    /// Whether resolution of `question` has been requested
    pub fn is_requested(&self, question: QuestionId) -> bool {
        self.questions
            .read()
            .get(&question)
            .map(|entry| entry.requested)
            .unwrap_or(false)
    }
}

impl OutcomeOracle for ManualOracle {
    fn request_resolution(&mut self, question: QuestionId) -> Result<(), OracleError> {
        self.questions.write().entry(question).or_default().requested = true;
        Ok(())
    }

    fn outcome(&self, question: QuestionId) -> Result<OracleReport, OracleError> {
        Ok(self
            .questions
            .read()
            .get(&question)
            .and_then(|entry| entry.report)
            .unwrap_or_else(OracleReport::pending))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
