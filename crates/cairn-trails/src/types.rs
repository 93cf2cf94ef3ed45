use serde::{Deserialize, Serialize};

use cairn_types::{SegmentId, TrailId};

/// A named, lockable grouping of segments.
///
/// `segment_count` and `total_value` are maintained incrementally on every
/// attach; `members` preserves attach order. `locked` makes a single
/// false→true transition, after which no further attaches are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailRecord {
    pub id: TrailId,
    /// Height at which the trail was created.
    pub created_at: u64,
    pub segment_count: u64,
    /// Sum of the attached segments' values.
    pub total_value: u128,
    pub locked: bool,
    /// Attached segment identifiers in attach order.
    pub members: Vec<SegmentId>,
}

impl TrailRecord {
    pub fn new(id: TrailId, created_at: u64) -> Self {
        Self {
            id,
            created_at,
            segment_count: 0,
            total_value: 0,
            locked: false,
            members: Vec::new(),
        }
    }
}
