use std::collections::HashMap;

use tracing::debug;

use cairn_crypto::chain;
use cairn_types::{ChainLink, SegmentId, SegmentTag};

use crate::error::LedgerError;
use crate::records::{LedgerStats, SegmentRecord};
use crate::traits::SegmentReader;

/// Limits the store enforces on every append, fixed at construction.
#[derive(Clone, Copy, Debug)]
pub struct StoreLimits {
    /// Maximum value a single segment may carry.
    pub max_segment_value: u64,
    /// Minimum spacing, in height units, between the ledger's origin marker
    /// and any append. Measured from the fixed origin, not from the
    /// previous segment.
    pub min_gap: u64,
    /// The deployment's origin height.
    pub origin_height: u64,
    /// Maximum weight assignable to a segment.
    pub max_weight: u64,
}

/// The authoritative segment store.
///
/// Owns the ordinal-indexed append log (an arena indexed by `ordinal - 1`
/// with an identity→index reverse map), the running hash chain, tag and
/// weight side maps, and the aggregate counters. Mutation is `&mut self`;
/// the facade serializes all access behind a single lock.
#[derive(Debug)]
pub struct SegmentStore {
    limits: StoreLimits,
    records: Vec<SegmentRecord>,
    by_id: HashMap<SegmentId, usize>,
    tags: HashMap<SegmentId, SegmentTag>,
    weights: HashMap<SegmentId, u64>,
    stats: LedgerStats,
    head: ChainLink,
}

impl SegmentStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            limits,
            records: Vec::new(),
            by_id: HashMap::new(),
            tags: HashMap::new(),
            weights: HashMap::new(),
            stats: LedgerStats::default(),
            head: ChainLink::zero(),
        }
    }

    /// Validate an append without mutating. Shared by [`Self::append`] and
    /// the batch pre-flight so a batch is checked in full before its first
    /// item is applied.
    pub fn check_append(
        &self,
        id: &SegmentId,
        value: u64,
        recorded_at: u64,
    ) -> Result<(), LedgerError> {
        if id.is_zero() {
            return Err(LedgerError::ZeroSegmentId);
        }
        if self.by_id.contains_key(id) {
            return Err(LedgerError::DuplicateSegment { id: *id });
        }
        if value > self.limits.max_segment_value {
            return Err(LedgerError::ValueExceedsCap {
                value,
                cap: self.limits.max_segment_value,
            });
        }
        let required = self.limits.origin_height + self.limits.min_gap;
        if recorded_at < required {
            return Err(LedgerError::GapTooShort {
                recorded_at,
                required,
            });
        }
        let last = self.last_recorded_at();
        if recorded_at < last {
            return Err(LedgerError::HeightRegression { recorded_at, last });
        }
        Ok(())
    }

    /// Validate a full batch, including intra-batch duplicates, without
    /// mutating. A batch that passes cannot fail item-by-item afterwards.
    pub fn check_append_batch(
        &self,
        entries: &[(SegmentId, u64)],
        recorded_at: u64,
    ) -> Result<(), LedgerError> {
        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        for (id, value) in entries {
            self.check_append(id, *value, recorded_at)?;
            if !seen.insert(*id) {
                return Err(LedgerError::DuplicateSegment { id: *id });
            }
        }
        Ok(())
    }

    /// Append a segment, assigning the next ordinal.
    ///
    /// Either the full record plus log entry plus counter update happens,
    /// or nothing does: every check precedes the first mutation.
    pub fn append(
        &mut self,
        id: SegmentId,
        value: u64,
        recorded_at: u64,
    ) -> Result<u64, LedgerError> {
        self.check_append(&id, value, recorded_at)?;

        let ordinal = self.stats.total_segments + 1;
        let link = chain::link_segment(&self.head, &id, value, ordinal, recorded_at);

        self.records.push(SegmentRecord {
            id,
            value,
            recorded_at,
            ordinal,
            sealed: false,
            link,
        });
        self.by_id.insert(id, (ordinal - 1) as usize);
        self.stats.total_segments = ordinal;
        self.stats.cumulative_value += value as u128;
        self.head = link;

        debug!(segment = %id.short_hex(), ordinal, value, "appended segment");
        Ok(ordinal)
    }

    /// Seal a segment. One-way; fails if unknown or already sealed.
    pub fn seal(&mut self, id: &SegmentId) -> Result<(), LedgerError> {
        let index = *self.by_id.get(id).ok_or(LedgerError::SegmentNotFound)?;
        let record = &mut self.records[index];
        if record.sealed {
            return Err(LedgerError::AlreadySealed);
        }
        record.sealed = true;
        self.stats.sealed_count += 1;

        debug!(segment = %id.short_hex(), sealed_count = self.stats.sealed_count, "sealed segment");
        Ok(())
    }

    /// Best-effort batch seal: already-sealed entries are skipped silently.
    /// Unknown identifiers still fail, before any flag flips. Returns the
    /// number of segments newly sealed by this call.
    pub fn seal_batch(&mut self, ids: &[SegmentId]) -> Result<u64, LedgerError> {
        for id in ids {
            if !self.by_id.contains_key(id) {
                return Err(LedgerError::SegmentNotFound);
            }
        }

        let mut newly_sealed = 0;
        for id in ids {
            let index = self.by_id[id];
            let record = &mut self.records[index];
            if !record.sealed {
                record.sealed = true;
                newly_sealed += 1;
            }
        }
        self.stats.sealed_count += newly_sealed;
        Ok(newly_sealed)
    }

    /// Assign a tag. Last write wins; the zero tag clears.
    pub fn set_tag(&mut self, id: &SegmentId, tag: SegmentTag) -> Result<(), LedgerError> {
        if !self.by_id.contains_key(id) {
            return Err(LedgerError::SegmentNotFound);
        }
        if tag.is_zero() {
            self.tags.remove(id);
        } else {
            self.tags.insert(*id, tag);
        }
        Ok(())
    }

    /// Assign a weight, bounded by the configured maximum.
    pub fn set_weight(&mut self, id: &SegmentId, weight: u64) -> Result<(), LedgerError> {
        if !self.by_id.contains_key(id) {
            return Err(LedgerError::SegmentNotFound);
        }
        if weight > self.limits.max_weight {
            return Err(LedgerError::WeightExceedsCap {
                weight,
                cap: self.limits.max_weight,
            });
        }
        self.weights.insert(*id, weight);
        Ok(())
    }

    /// Recompute the segment's chain link from its stored fields and its
    /// predecessor's stored link and compare byte-for-byte. Returns `false`
    /// (never errors) for unrecorded identifiers.
    pub fn verify(&self, id: &SegmentId) -> bool {
        let Some(&index) = self.by_id.get(id) else {
            return false;
        };
        let record = &self.records[index];
        let prev = if index == 0 {
            ChainLink::zero()
        } else {
            self.records[index - 1].link
        };
        let expected = chain::link_segment(
            &prev,
            &record.id,
            record.value,
            record.ordinal,
            record.recorded_at,
        );
        expected == record.link
    }

    /// The chain link of the most recent segment, or the zero sentinel for
    /// an empty ledger.
    pub fn head_link(&self) -> ChainLink {
        self.head
    }

    /// Height of the most recent append; the origin height when empty.
    pub fn last_recorded_at(&self) -> u64 {
        self.records
            .last()
            .map(|r| r.recorded_at)
            .unwrap_or(self.limits.origin_height)
    }

    /// The full append-ordered record slice, for offline verification.
    pub fn records(&self) -> &[SegmentRecord] {
        &self.records
    }

    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }
}

impl SegmentReader for SegmentStore {
    fn get(&self, id: &SegmentId) -> Result<&SegmentRecord, LedgerError> {
        self.by_id
            .get(id)
            .map(|&index| &self.records[index])
            .ok_or(LedgerError::SegmentNotFound)
    }

    fn get_by_ordinal(&self, ordinal: u64) -> Result<&SegmentRecord, LedgerError> {
        if ordinal == 0 || ordinal > self.stats.total_segments {
            return Err(LedgerError::OrdinalOutOfRange {
                ordinal,
                total: self.stats.total_segments,
            });
        }
        Ok(&self.records[(ordinal - 1) as usize])
    }

    fn exists(&self, id: &SegmentId) -> bool {
        self.by_id.contains_key(id)
    }

    fn stats(&self) -> LedgerStats {
        self.stats
    }

    fn tag_of(&self, id: &SegmentId) -> SegmentTag {
        self.tags.get(id).copied().unwrap_or(SegmentTag::zero())
    }

    fn weight_of(&self, id: &SegmentId) -> u64 {
        self.weights.get(id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use cairn_crypto::ChainVerifier;

    use super::*;

    fn limits() -> StoreLimits {
        StoreLimits {
            max_segment_value: 1_000,
            min_gap: 10,
            origin_height: 100,
            max_weight: 1_000,
        }
    }

    fn store() -> SegmentStore {
        SegmentStore::new(limits())
    }

    fn seg(n: u8) -> SegmentId {
        SegmentId::from_raw([n; 32])
    }

    #[test]
    fn append_assigns_dense_ordinals() {
        let mut s = store();
        assert_eq!(s.append(seg(1), 10, 110).unwrap(), 1);
        assert_eq!(s.append(seg(2), 20, 111).unwrap(), 2);
        assert_eq!(s.append(seg(3), 30, 112).unwrap(), 3);

        let stats = s.stats();
        assert_eq!(stats.total_segments, 3);
        assert_eq!(stats.cumulative_value, 60);
        assert_eq!(s.get_by_ordinal(2).unwrap().id, seg(2));
    }

    #[test]
    fn zero_id_rejected() {
        let mut s = store();
        assert_eq!(
            s.append(SegmentId::zero(), 1, 110).unwrap_err(),
            LedgerError::ZeroSegmentId
        );
    }

    #[test]
    fn duplicate_rejected() {
        let mut s = store();
        s.append(seg(1), 10, 110).unwrap();
        assert_eq!(
            s.append(seg(1), 20, 111).unwrap_err(),
            LedgerError::DuplicateSegment { id: seg(1) }
        );
        // The failed append left no trace.
        assert_eq!(s.stats().total_segments, 1);
        assert_eq!(s.stats().cumulative_value, 10);
    }

    #[test]
    fn value_cap_enforced() {
        let mut s = store();
        assert_eq!(
            s.append(seg(1), 1_001, 110).unwrap_err(),
            LedgerError::ValueExceedsCap {
                value: 1_001,
                cap: 1_000
            }
        );
    }

    #[test]
    fn gap_measured_from_origin() {
        let mut s = store();
        // origin 100 + min_gap 10 => first valid height is 110.
        assert_eq!(
            s.append(seg(1), 1, 109).unwrap_err(),
            LedgerError::GapTooShort {
                recorded_at: 109,
                required: 110
            }
        );
        s.append(seg(1), 1, 110).unwrap();
        // The gap stays anchored at the origin: 110 is still valid later.
        s.append(seg(2), 1, 110).unwrap();
    }

    #[test]
    fn height_regression_rejected() {
        let mut s = store();
        s.append(seg(1), 1, 120).unwrap();
        assert_eq!(
            s.append(seg(2), 1, 119).unwrap_err(),
            LedgerError::HeightRegression {
                recorded_at: 119,
                last: 120
            }
        );
    }

    #[test]
    fn seal_flips_once() {
        let mut s = store();
        s.append(seg(1), 1, 110).unwrap();
        s.seal(&seg(1)).unwrap();
        assert!(s.get(&seg(1)).unwrap().sealed);
        assert_eq!(s.stats().sealed_count, 1);
        assert_eq!(s.seal(&seg(1)).unwrap_err(), LedgerError::AlreadySealed);
        assert_eq!(s.stats().sealed_count, 1);
    }

    #[test]
    fn seal_unknown_fails() {
        let mut s = store();
        assert_eq!(s.seal(&seg(9)).unwrap_err(), LedgerError::SegmentNotFound);
    }

    #[test]
    fn seal_batch_skips_already_sealed() {
        let mut s = store();
        s.append(seg(1), 1, 110).unwrap();
        s.append(seg(2), 1, 110).unwrap();
        s.seal(&seg(1)).unwrap();

        let newly = s.seal_batch(&[seg(1), seg(2)]).unwrap();
        assert_eq!(newly, 1);
        assert_eq!(s.stats().sealed_count, 2);

        // Fully idempotent second pass.
        assert_eq!(s.seal_batch(&[seg(1), seg(2)]).unwrap(), 0);
        assert_eq!(s.stats().sealed_count, 2);
    }

    #[test]
    fn seal_batch_unknown_id_fails_before_mutation() {
        let mut s = store();
        s.append(seg(1), 1, 110).unwrap();
        let err = s.seal_batch(&[seg(1), seg(9)]).unwrap_err();
        assert_eq!(err, LedgerError::SegmentNotFound);
        assert!(!s.get(&seg(1)).unwrap().sealed);
        assert_eq!(s.stats().sealed_count, 0);
    }

    #[test]
    fn batch_check_catches_intra_batch_duplicate() {
        let s = store();
        let err = s
            .check_append_batch(&[(seg(1), 1), (seg(1), 2)], 110)
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateSegment { id: seg(1) });
    }

    #[test]
    fn ordinal_lookup_bounds() {
        let mut s = store();
        s.append(seg(1), 1, 110).unwrap();
        assert!(matches!(
            s.get_by_ordinal(0),
            Err(LedgerError::OrdinalOutOfRange { ordinal: 0, .. })
        ));
        assert!(matches!(
            s.get_by_ordinal(2),
            Err(LedgerError::OrdinalOutOfRange { ordinal: 2, .. })
        ));
        assert_eq!(s.get_by_ordinal(1).unwrap().id, seg(1));
    }

    #[test]
    fn verify_holds_after_later_appends() {
        let mut s = store();
        s.append(seg(1), 10, 110).unwrap();
        assert!(s.verify(&seg(1)));
        s.append(seg(2), 20, 111).unwrap();
        s.append(seg(3), 30, 112).unwrap();
        assert!(s.verify(&seg(1)));
        assert!(s.verify(&seg(2)));
        assert!(s.verify(&seg(3)));
        ChainVerifier::verify_chain(s.records()).unwrap();
    }

    #[test]
    fn verify_false_for_unknown() {
        let s = store();
        assert!(!s.verify(&seg(7)));
    }

    #[test]
    fn head_link_advances() {
        let mut s = store();
        assert!(s.head_link().is_zero());
        s.append(seg(1), 1, 110).unwrap();
        let head1 = s.head_link();
        assert!(!head1.is_zero());
        s.append(seg(2), 1, 110).unwrap();
        assert_ne!(s.head_link(), head1);
        assert_eq!(s.head_link(), s.get_by_ordinal(2).unwrap().link);
    }

    #[test]
    fn tags_and_weights() {
        let mut s = store();
        s.append(seg(1), 1, 110).unwrap();

        let tag = SegmentTag::from_label("alpine");
        s.set_tag(&seg(1), tag).unwrap();
        assert_eq!(s.tag_of(&seg(1)), tag);
        s.set_tag(&seg(1), SegmentTag::zero()).unwrap();
        assert!(s.tag_of(&seg(1)).is_zero());

        s.set_weight(&seg(1), 250).unwrap();
        assert_eq!(s.weight_of(&seg(1)), 250);
        assert_eq!(
            s.set_weight(&seg(1), 1_001).unwrap_err(),
            LedgerError::WeightExceedsCap {
                weight: 1_001,
                cap: 1_000
            }
        );

        assert_eq!(
            s.set_tag(&seg(9), tag).unwrap_err(),
            LedgerError::SegmentNotFound
        );
        assert_eq!(
            s.set_weight(&seg(9), 1).unwrap_err(),
            LedgerError::SegmentNotFound
        );
    }
}
