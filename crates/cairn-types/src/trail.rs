use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque identifier for a named trail grouping.
///
/// Like [`crate::SegmentId`], a `TrailId` is a 32-byte value with the
/// all-zero sentinel reserved as invalid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrailId([u8; 32]);

impl TrailId {
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a `TrailId` from a human-readable trail name.
    pub fn from_name(name: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"cairn-trail-v1:");
        hasher.update(name.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for TrailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrailId({})", self.short_hex())
    }
}

impl fmt::Display for TrailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_deterministic() {
        assert_eq!(TrailId::from_name("ridge"), TrailId::from_name("ridge"));
        assert_ne!(TrailId::from_name("ridge"), TrailId::from_name("valley"));
    }

    #[test]
    fn zero_is_sentinel() {
        assert!(TrailId::zero().is_zero());
        assert!(!TrailId::from_name("ridge").is_zero());
    }

    #[test]
    fn hex_roundtrip() {
        let id = TrailId::from_name("summit");
        assert_eq!(TrailId::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn name_and_segment_domains_differ() {
        // Same material hashed under different domains must not collide.
        let trail = TrailId::from_name("shared");
        let segment = crate::SegmentId::derive(b"shared");
        assert_ne!(trail.as_bytes(), segment.as_bytes());
    }
}
