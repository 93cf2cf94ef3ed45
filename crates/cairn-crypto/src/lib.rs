//! Cryptographic primitives for the Cairn segment ledger.
//!
//! Two concerns live here:
//! - [`DomainHasher`] — domain-separated BLAKE3 hashing, so values of
//!   different kinds can never collide even over identical bytes
//! - [`chain`] — the pure chain-link recurrence binding each segment to its
//!   predecessor, plus an offline whole-chain verifier

pub mod chain;
pub mod hasher;

pub use chain::{link_segment, ChainFault, ChainVerifier, LinkedSegment};
pub use hasher::{DomainHasher, HasherError};
