//! Trail groupings for the Cairn segment ledger.
//!
//! A trail is a named, lockable collection of segments. Membership is
//! exclusive (a segment belongs to at most one trail, first attach wins)
//! and aggregate totals are maintained incrementally on attach rather than
//! recomputed on read.

pub mod error;
pub mod index;
pub mod types;

pub use error::TrailError;
pub use index::TrailIndex;
pub use types::TrailRecord;
