//! Foundation types for the Cairn segment ledger.
//!
//! This crate provides the identity and structural types used throughout the
//! Cairn system. Every other Cairn crate depends on `cairn-types`.
//!
//! # Key Types
//!
//! - [`SegmentId`] — Opaque 32-byte identifier for a recorded segment
//! - [`TrailId`] — Opaque 32-byte identifier for a named trail grouping
//! - [`ActorId`] — Identity of a privileged caller (trailhead or relayer)
//! - [`SegmentTag`] — 32-byte classification tag attached to a segment
//! - [`ChainLink`] — Hash binding a segment to its predecessor

pub mod actor;
pub mod error;
pub mod link;
pub mod segment;
pub mod trail;

pub use actor::ActorId;
pub use error::TypeError;
pub use link::ChainLink;
pub use segment::{SegmentId, SegmentTag};
pub use trail::TrailId;
