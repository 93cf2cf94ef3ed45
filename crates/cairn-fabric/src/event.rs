use serde::{Deserialize, Serialize};

use cairn_crypto::DomainHasher;
use cairn_types::{SegmentId, SegmentTag, TrailId};

/// Unique identifier for a ledger event (content-addressed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub hash: [u8; 32],
}

impl EventId {
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self { hash }
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.hash[..4])
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evt:{}", self.short_hex())
    }
}

/// Classification of ledger events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    SegmentRecorded,
    SegmentSealed,
    SegmentsSealed,
    TrailCreated,
    SegmentAttached,
    TrailLocked,
    EpochCaptured,
    TagAssigned,
    WeightAssigned,
    LedgerFrozen,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SegmentRecorded => "SegmentRecorded",
            Self::SegmentSealed => "SegmentSealed",
            Self::SegmentsSealed => "SegmentsSealed",
            Self::TrailCreated => "TrailCreated",
            Self::SegmentAttached => "SegmentAttached",
            Self::TrailLocked => "TrailLocked",
            Self::EpochCaptured => "EpochCaptured",
            Self::TagAssigned => "TagAssigned",
            Self::WeightAssigned => "WeightAssigned",
            Self::LedgerFrozen => "LedgerFrozen",
        };
        write!(f, "{s}")
    }
}

/// Payload carried by a ledger event: the operation's key identifiers plus
/// the counters that resulted from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    SegmentRecorded {
        segment: SegmentId,
        ordinal: u64,
        value: u64,
        total_segments: u64,
        cumulative_value: u128,
    },
    SegmentSealed {
        segment: SegmentId,
        sealed_count: u64,
    },
    SegmentsSealed {
        newly_sealed: u64,
        sealed_count: u64,
    },
    TrailCreated {
        trail: TrailId,
    },
    SegmentAttached {
        segment: SegmentId,
        trail: TrailId,
        segment_count: u64,
        total_value: u128,
    },
    TrailLocked {
        trail: TrailId,
    },
    EpochCaptured {
        index: u64,
        at_segment_count: u64,
        fingerprint: [u8; 32],
    },
    TagAssigned {
        segment: SegmentId,
        tag: SegmentTag,
    },
    WeightAssigned {
        segment: SegmentId,
        weight: u64,
    },
    LedgerFrozen {
        total_segments: u64,
    },
}

impl EventPayload {
    /// The classification this payload belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SegmentRecorded { .. } => EventKind::SegmentRecorded,
            Self::SegmentSealed { .. } => EventKind::SegmentSealed,
            Self::SegmentsSealed { .. } => EventKind::SegmentsSealed,
            Self::TrailCreated { .. } => EventKind::TrailCreated,
            Self::SegmentAttached { .. } => EventKind::SegmentAttached,
            Self::TrailLocked { .. } => EventKind::TrailLocked,
            Self::EpochCaptured { .. } => EventKind::EpochCaptured,
            Self::TagAssigned { .. } => EventKind::TagAssigned,
            Self::WeightAssigned { .. } => EventKind::WeightAssigned,
            Self::LedgerFrozen { .. } => EventKind::LedgerFrozen,
        }
    }

    /// The trail this payload pertains to, if any.
    pub fn trail(&self) -> Option<TrailId> {
        match self {
            Self::TrailCreated { trail }
            | Self::SegmentAttached { trail, .. }
            | Self::TrailLocked { trail } => Some(*trail),
            _ => None,
        }
    }
}

/// A single state-change notification.
///
/// Carries a content-addressed id, the height of the mutation that produced
/// it, a classification kind, the payload, and a BLAKE3 integrity hash
/// computed over (height, kind, payload).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub id: EventId,
    /// Height of the mutation that produced this event.
    pub height: u64,
    pub kind: EventKind,
    pub payload: EventPayload,
    pub integrity_hash: [u8; 32],
}

impl LedgerEvent {
    /// Build an event, computing its integrity hash and id.
    pub fn new(height: u64, payload: EventPayload) -> Self {
        let kind = payload.kind();
        let integrity_hash = Self::compute_integrity(height, &kind, &payload);
        Self {
            id: EventId::from_hash(integrity_hash),
            height,
            kind,
            payload,
            integrity_hash,
        }
    }

    /// Verify the event's integrity hash matches its content.
    pub fn verify_integrity(&self) -> bool {
        self.integrity_hash == Self::compute_integrity(self.height, &self.kind, &self.payload)
    }

    fn compute_integrity(height: u64, kind: &EventKind, payload: &EventPayload) -> [u8; 32] {
        let mut hasher = DomainHasher::EVENT.streaming();
        hasher.update(&height.to_le_bytes());
        if let Ok(kind_bytes) = bincode::serialize(kind) {
            hasher.update(&kind_bytes);
        }
        if let Ok(payload_bytes) = bincode::serialize(payload) {
            hasher.update(&payload_bytes);
        }
        *hasher.finalize().as_bytes()
    }
}
