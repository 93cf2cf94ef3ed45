use cairn_types::{SegmentId, SegmentTag};

use crate::error::LedgerError;
use crate::records::{LedgerStats, SegmentRecord};

/// Read boundary over the segment store.
///
/// The query engine and external projections depend on this trait rather
/// than on [`crate::SegmentStore`] directly, keeping read-side consumers
/// independent of the owned mutable state.
pub trait SegmentReader {
    /// Look up a segment by identity.
    fn get(&self, id: &SegmentId) -> Result<&SegmentRecord, LedgerError>;

    /// Look up a segment by 1-based ordinal. Fails with
    /// [`LedgerError::OrdinalOutOfRange`] for `0` or values beyond the
    /// current count.
    fn get_by_ordinal(&self, ordinal: u64) -> Result<&SegmentRecord, LedgerError>;

    fn exists(&self, id: &SegmentId) -> bool;

    /// Aggregate counters at the current log position.
    fn stats(&self) -> LedgerStats;

    /// The segment's tag; the zero tag means untagged.
    fn tag_of(&self, id: &SegmentId) -> SegmentTag;

    /// The segment's weight; `0` means unset (treated as multiplier 1 by
    /// weighted aggregation).
    fn weight_of(&self, id: &SegmentId) -> u64;
}
