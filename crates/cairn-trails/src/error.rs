use cairn_types::{SegmentId, TrailId};

/// Errors produced by trail operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrailError {
    #[error("trail identifier is the zero sentinel")]
    ZeroTrailId,

    #[error("trail already exists: {id}")]
    TrailExists { id: TrailId },

    #[error("trail not found")]
    TrailNotFound,

    #[error("trail is locked")]
    TrailLocked,

    #[error("trail is already locked")]
    AlreadyLocked,

    #[error("segment {segment} is already attached to trail {trail}")]
    AlreadyAttached { segment: SegmentId, trail: TrailId },

    #[error("trail is at capacity ({capacity} segments)")]
    TrailFull { capacity: usize },
}
