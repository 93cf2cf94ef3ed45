use cairn_types::SegmentId;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("segment identifier is the zero sentinel")]
    ZeroSegmentId,

    #[error("segment already recorded: {id}")]
    DuplicateSegment { id: SegmentId },

    #[error("segment value {value} exceeds cap {cap}")]
    ValueExceedsCap { value: u64, cap: u64 },

    #[error("gap too short: recorded_at {recorded_at} is before minimum height {required}")]
    GapTooShort { recorded_at: u64, required: u64 },

    #[error("height regression: recorded_at {recorded_at} is below last appended height {last}")]
    HeightRegression { recorded_at: u64, last: u64 },

    #[error("segment not found")]
    SegmentNotFound,

    #[error("segment already sealed")]
    AlreadySealed,

    #[error("ordinal {ordinal} out of range: ledger holds {total} segments")]
    OrdinalOutOfRange { ordinal: u64, total: u64 },

    #[error("epoch index {index} out of range: current epoch index is {current}")]
    EpochOutOfRange { index: u64, current: u64 },

    #[error("weight {weight} exceeds cap {cap}")]
    WeightExceedsCap { weight: u64, cap: u64 },

    #[error("invalid ordinal range: start={start}, end={end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("requested batch of {requested} exceeds maximum of {max}")]
    BatchTooLarge { requested: u64, max: u64 },

    #[error("height span {span} exceeds observation window {window}")]
    WindowExceeded { span: u64, window: u64 },
}
