use cairn_types::{ChainLink, SegmentId};

use crate::hasher::DomainHasher;

/// Compute the chain link for a segment.
///
/// Pure function over the caller-supplied previous link and the segment's
/// own attributes; the ledger never threads hidden state through it, so the
/// chain can be recomputed offline from a record list alone. Ordinal 1
/// links from [`ChainLink::zero`]. All integer fields are absorbed in
/// little-endian fixed-width form.
pub fn link_segment(
    prev: &ChainLink,
    id: &SegmentId,
    value: u64,
    ordinal: u64,
    recorded_at: u64,
) -> ChainLink {
    let mut hasher = DomainHasher::LINK.streaming();
    hasher.update(prev.as_bytes());
    hasher.update(id.as_bytes());
    hasher.update(&value.to_le_bytes());
    hasher.update(&ordinal.to_le_bytes());
    hasher.update(&recorded_at.to_le_bytes());
    ChainLink::from_raw(*hasher.finalize().as_bytes())
}

/// Trait for records that participate in the segment chain.
pub trait LinkedSegment {
    fn segment_id(&self) -> &SegmentId;
    fn value(&self) -> u64;
    fn ordinal(&self) -> u64;
    fn recorded_at(&self) -> u64;
    /// The stored chain link for this segment.
    fn link(&self) -> ChainLink;
}

/// Offline chain verifier.
///
/// Verifies that an ordinal-ordered record list forms a valid chain: the
/// ordinals are dense from 1, and each stored link is reproduced by
/// [`link_segment`] from the record's own fields and its predecessor's
/// stored link.
pub struct ChainVerifier;

impl ChainVerifier {
    /// Verify a full chain prefix. Reports the first fault found.
    pub fn verify_chain(segments: &[impl LinkedSegment]) -> Result<(), ChainFault> {
        let mut prev = ChainLink::zero();
        for (index, segment) in segments.iter().enumerate() {
            let expected = index as u64 + 1;
            if segment.ordinal() != expected {
                return Err(ChainFault::OrdinalGap {
                    expected,
                    found: segment.ordinal(),
                });
            }

            let computed = link_segment(
                &prev,
                segment.segment_id(),
                segment.value(),
                segment.ordinal(),
                segment.recorded_at(),
            );
            if computed != segment.link() {
                return Err(ChainFault::LinkMismatch {
                    ordinal: segment.ordinal(),
                });
            }
            prev = computed;
        }
        Ok(())
    }
}

/// Faults from chain verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainFault {
    #[error("ordinal gap: expected {expected}, found {found}")]
    OrdinalGap { expected: u64, found: u64 },

    #[error("chain link mismatch at ordinal {ordinal}: stored link does not recompute")]
    LinkMismatch { ordinal: u64 },
}
