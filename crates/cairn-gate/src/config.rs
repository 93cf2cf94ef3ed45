use serde::{Deserialize, Serialize};

use cairn_crypto::DomainHasher;

/// Fixed system constants.
///
/// These bound every batch operation and derived structure regardless of
/// deployment configuration.
pub mod limits {
    /// Maximum items per batch call (append, seal, attach).
    pub const BATCH_APPEND_LIMIT: usize = 100;
    /// Minimum ledger age, in height units past the origin, before freezing
    /// is allowed.
    pub const FREEZE_DELAY: u64 = 1_024;
    /// An epoch snapshot is captured every this many appends.
    pub const EPOCH_CADENCE: u64 = 64;
    /// Maximum segments per trail.
    pub const TRAIL_CAPACITY: usize = 512;
    /// Maximum weight assignable to a segment.
    pub const MAX_WEIGHT: u64 = 1_000;
    /// Maximum ordinals a single range query may cover.
    pub const MAX_VIEW_BATCH: u64 = 256;
}

/// Deployment configuration, fixed at initialization and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Human-readable deployment label; feeds the domain-separation
    /// fingerprint.
    pub deployment: String,
    /// The ledger's origin marker. The gap check and the freeze delay are
    /// both anchored here.
    pub origin_height: u64,
    /// Maximum value a single segment may carry.
    pub max_segment_value: u64,
    /// Minimum spacing, in height units from the origin, before any append
    /// is accepted.
    pub min_gap: u64,
    /// Maximum height span a block-range scan may cover.
    pub observation_window: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            deployment: "local".to_string(),
            origin_height: 0,
            max_segment_value: 1_000_000,
            min_gap: 0,
            observation_window: 10_000,
        }
    }
}

impl LedgerConfig {
    /// The 32-byte domain-separation fingerprint derived from this
    /// deployment's context. Folded into every epoch fingerprint so
    /// snapshots from different deployments can never be confused.
    pub fn deployment_fingerprint(&self) -> [u8; 32] {
        DomainHasher::DEPLOYMENT
            .hash_json(self)
            .unwrap_or([0u8; 32])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LedgerConfig::default();
        assert_eq!(c.deployment, "local");
        assert_eq!(c.origin_height, 0);
        assert_eq!(c.max_segment_value, 1_000_000);
        assert_eq!(c.min_gap, 0);
        assert_eq!(c.observation_window, 10_000);
    }

    #[test]
    fn fingerprint_is_deterministic_per_deployment() {
        let a = LedgerConfig::default();
        let b = LedgerConfig::default();
        assert_eq!(a.deployment_fingerprint(), b.deployment_fingerprint());

        let c = LedgerConfig {
            deployment: "mainline".to_string(),
            ..Default::default()
        };
        assert_ne!(a.deployment_fingerprint(), c.deployment_fingerprint());

        let d = LedgerConfig {
            origin_height: 500,
            ..Default::default()
        };
        assert_ne!(a.deployment_fingerprint(), d.deployment_fingerprint());
    }

    #[test]
    fn serde_roundtrip() {
        let config = LedgerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LedgerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
