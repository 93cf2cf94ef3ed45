use tracing::info;

use cairn_crypto::DomainHasher;

use crate::error::LedgerError;
use crate::records::{EpochSnapshot, LedgerStats};

/// Cadence-driven recorder of immutable epoch fingerprints.
///
/// Observes the aggregate counters after every successful append; whenever
/// the running segment count is an exact multiple of the cadence, it
/// captures a snapshot at the next dense index. Snapshots are never mutated
/// after capture, and `current_index()` always equals
/// `total_segments / cadence`.
#[derive(Debug)]
pub struct EpochRecorder {
    cadence: u64,
    deployment_fingerprint: [u8; 32],
    snapshots: Vec<EpochSnapshot>,
}

impl EpochRecorder {
    /// `cadence` must be non-zero.
    pub fn new(cadence: u64, deployment_fingerprint: [u8; 32]) -> Self {
        assert!(cadence > 0, "epoch cadence must be non-zero");
        Self {
            cadence,
            deployment_fingerprint,
            snapshots: Vec::new(),
        }
    }

    /// Called inline after each successful append. Returns the snapshot
    /// captured by this observation, if the cadence boundary was crossed.
    pub fn observe_append(
        &mut self,
        stats: &LedgerStats,
        recorded_at: u64,
    ) -> Option<&EpochSnapshot> {
        if stats.total_segments == 0 || stats.total_segments % self.cadence != 0 {
            return None;
        }

        let index = self.snapshots.len() as u64;
        let fingerprint = self.fingerprint(stats, recorded_at, index);
        self.snapshots.push(EpochSnapshot {
            index,
            recorded_at,
            at_segment_count: stats.total_segments,
            sealed_count: stats.sealed_count,
            cumulative_value: stats.cumulative_value,
            fingerprint,
        });

        info!(
            epoch = index,
            at_segment_count = stats.total_segments,
            "captured epoch snapshot"
        );
        self.snapshots.last()
    }

    /// The next epoch index to be assigned; equals the number of captured
    /// snapshots.
    pub fn current_index(&self) -> u64 {
        self.snapshots.len() as u64
    }

    /// Fetch a captured snapshot. Fails with
    /// [`LedgerError::EpochOutOfRange`] for `index >= current_index()`.
    pub fn get(&self, index: u64) -> Result<&EpochSnapshot, LedgerError> {
        self.snapshots
            .get(index as usize)
            .ok_or(LedgerError::EpochOutOfRange {
                index,
                current: self.current_index(),
            })
    }

    pub fn latest(&self) -> Option<&EpochSnapshot> {
        self.snapshots.last()
    }

    pub fn cadence(&self) -> u64 {
        self.cadence
    }

    fn fingerprint(&self, stats: &LedgerStats, recorded_at: u64, index: u64) -> [u8; 32] {
        let mut hasher = DomainHasher::EPOCH.streaming();
        hasher.update(&self.deployment_fingerprint);
        hasher.update(&stats.total_segments.to_le_bytes());
        hasher.update(&stats.sealed_count.to_le_bytes());
        hasher.update(&stats.cumulative_value.to_le_bytes());
        hasher.update(&recorded_at.to_le_bytes());
        hasher.update(&index.to_le_bytes());
        *hasher.finalize().as_bytes()
    }
}
