//! Market record held by the registry.

use crate::amm::Exposure;
use crate::error::{Error, Result};
use crate::types::{MarketConfig, MarketId, MarketStatus, Resolution};

/// A registered market: immutable configuration plus lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    id: MarketId,
    config: MarketConfig,
    status: MarketStatus,
    resolution: Option<Resolution>,
}

impl Market {
    pub(crate) fn new(id: MarketId, config: MarketConfig) -> Self {
        Self {
            id,
            config,
            status: MarketStatus::Open,
            resolution: None,
        }
    }

    #[inline]
    pub fn id(&self) -> MarketId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    #[inline]
    pub fn status(&self) -> MarketStatus {
        self.status
    }

    #[inline]
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    #[inline]
    pub fn outcome_count(&self) -> u8 {
        self.config.outcome_count
    }

    #[inline]
    pub fn deadline(&self) -> u64 {
        self.config.deadline
    }

    /// Open for trading: status Open and the deadline not yet reached
    #[inline]
    pub fn is_open(&self, now: u64) -> bool {
        self.status == MarketStatus::Open && now < self.config.deadline
    }

    pub fn check_outcome(&self, outcome: u8) -> Result<()> {
        if outcome >= self.outcome_count() {
            return Err(Error::OutcomeOutOfRange {
                outcome,
                count: self.outcome_count(),
            });
        }
        Ok(())
    }

    /// Which outcome tokens the vault may still have to pay out
    pub fn exposure(&self) -> Exposure {
        match self.resolution {
            None if self.config.invalid_refunds() => Exposure::AllOutcomes,
            None => Exposure::LargestOutcome,
            Some(resolution) if !resolution.invalid => Exposure::Outcome(resolution.winning_outcome),
            Some(_) if self.config.invalid_refunds() => Exposure::AllOutcomes,
            Some(_) => Exposure::Nothing,
        }
    }

    // Transitions are only driven by the registry, which enforces the order.

    pub(crate) fn set_status(&mut self, status: MarketStatus) {
        self.status = status;
    }

    pub(crate) fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = Some(resolution);
        self.status = MarketStatus::Resolved;
    }

    /// Append the lifecycle state to a state-root preimage
    pub(crate) fn encode_state(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.id.as_bytes());
        buf.push(self.status.to_u8());
        match self.resolution {
            Some(resolution) => {
                buf.push(1);
                buf.push(resolution.winning_outcome);
                buf.push(resolution.invalid as u8);
                buf.extend_from_slice(&resolution.resolved_at.to_le_bytes());
            }
            None => buf.push(0),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetId, MarketFlags, OracleId, QuestionId};

    fn market(flags: MarketFlags) -> Market {
        let config = MarketConfig::new(
            AssetId::derive(b"c"),
            100,
            flags,
            3,
            OracleId::derive(b"o"),
            QuestionId::derive(b"q"),
        );
        Market::new(config.market_id().unwrap(), config)
    }

    #[test]
    fn test_is_open() {
        let mut m = market(MarketFlags::NONE);
        assert!(m.is_open(0));
        assert!(m.is_open(99));
        assert!(!m.is_open(100));
        m.set_status(MarketStatus::Resolvable);
        assert!(!m.is_open(0));
    }

    #[test]
    fn test_check_outcome() {
        let m = market(MarketFlags::NONE);
        assert!(m.check_outcome(2).is_ok());
        assert_eq!(
            m.check_outcome(3),
            Err(Error::OutcomeOutOfRange { outcome: 3, count: 3 })
        );
    }

    #[test]
    fn test_exposure() {
        let mut m = market(MarketFlags::NONE);
        assert_eq!(m.exposure(), Exposure::LargestOutcome);
        m.set_resolution(Resolution {
            winning_outcome: 1,
            invalid: false,
            resolved_at: 5,
        });
        assert_eq!(m.exposure(), Exposure::Outcome(1));
        assert_eq!(m.status(), MarketStatus::Resolved);

        let mut invalid = market(MarketFlags::NONE);
        invalid.set_resolution(Resolution {
            winning_outcome: 0,
            invalid: true,
            resolved_at: 5,
        });
        assert_eq!(invalid.exposure(), Exposure::Nothing);

        let mut refunding = market(MarketFlags::INVALID_REFUNDS);
        assert_eq!(refunding.exposure(), Exposure::AllOutcomes);
        refunding.set_resolution(Resolution {
            winning_outcome: 0,
            invalid: true,
            resolved_at: 5,
        });
        assert_eq!(refunding.exposure(), Exposure::AllOutcomes);
    }

    #[test]
    fn test_state_encoding_changes_with_status() {
        let mut m = market(MarketFlags::NONE);
        let mut before = Vec::new();
        m.encode_state(&mut before);
        m.set_status(MarketStatus::Resolvable);
        let mut after = Vec::new();
        m.encode_state(&mut after);
        assert_ne!(before, after);
    }
}
