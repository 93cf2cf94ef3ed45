//! Append-only segment ledger for Cairn.
//!
//! This crate is the heart of Cairn. It provides:
//! - The authoritative [`SegmentStore`]: an ordinal-indexed append log with
//!   O(1) identity and ordinal lookup, hash-chain maintenance, and
//!   monotonic counters
//! - The [`EpochRecorder`]: cadence-driven immutable fingerprints of
//!   aggregate ledger state
//! - The [`RangeQuery`] engine: bounded aggregations over ordinal and
//!   height sub-ranges
//! - The [`SegmentReader`] trait boundary separating reads from the owned
//!   store

pub mod epoch;
pub mod error;
pub mod query;
pub mod records;
pub mod store;
pub mod traits;

pub use epoch::EpochRecorder;
pub use error::LedgerError;
pub use query::{QueryLimits, RangeQuery, RangeStats};
pub use records::{EpochSnapshot, LedgerStats, SegmentRecord};
pub use store::{SegmentStore, StoreLimits};
pub use traits::SegmentReader;
