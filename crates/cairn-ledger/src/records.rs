use serde::{Deserialize, Serialize};

use cairn_crypto::LinkedSegment;
use cairn_types::{ChainLink, SegmentId};

/// A recorded segment.
///
/// `value`, `recorded_at`, `ordinal`, and `link` are immutable after
/// creation; `sealed` makes a single false→true transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub id: SegmentId,
    /// Bounded non-negative value, at most the configured cap.
    pub value: u64,
    /// Block height at append time. Non-decreasing across the log.
    pub recorded_at: u64,
    /// 1-based position in append order. Dense and gapless.
    pub ordinal: u64,
    pub sealed: bool,
    /// Chain link binding this segment to its predecessor.
    pub link: ChainLink,
}

impl LinkedSegment for SegmentRecord {
    fn segment_id(&self) -> &SegmentId {
        &self.id
    }
    fn value(&self) -> u64 {
        self.value
    }
    fn ordinal(&self) -> u64 {
        self.ordinal
    }
    fn recorded_at(&self) -> u64 {
        self.recorded_at
    }
    fn link(&self) -> ChainLink {
        self.link
    }
}

/// Aggregate ledger counters. All fields are monotonically non-decreasing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_segments: u64,
    pub sealed_count: u64,
    pub cumulative_value: u128,
}

/// An immutable fingerprint of aggregate ledger state.
///
/// Captured whenever the running segment count reaches an exact multiple of
/// the epoch cadence. Indices are dense and gapless starting at 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochSnapshot {
    pub index: u64,
    /// Height of the append that triggered the capture.
    pub recorded_at: u64,
    pub at_segment_count: u64,
    pub sealed_count: u64,
    pub cumulative_value: u128,
    pub fingerprint: [u8; 32],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_record_serde_roundtrip() {
        let record = SegmentRecord {
            id: SegmentId::derive(b"roundtrip"),
            value: 42,
            recorded_at: 1_000,
            ordinal: 7,
            sealed: false,
            link: ChainLink::from_raw([3; 32]),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SegmentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn stats_default_is_empty() {
        let stats = LedgerStats::default();
        assert_eq!(stats.total_segments, 0);
        assert_eq!(stats.sealed_count, 0);
        assert_eq!(stats.cumulative_value, 0);
    }
}
