use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a privileged caller.
///
/// Exactly two actors exist per deployment: the trailhead (single-segment
/// writer and administrator) and the relayer (batch writer). Both are fixed
/// at initialization; the gate compares caller identities against them on
/// every mutating call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId([u8; 32]);

impl ActorId {
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an `ActorId` from deployment key material.
    pub fn derive(material: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"cairn-actor-v1:");
        hasher.update(material);
        Self(*hasher.finalize().as_bytes())
    }

    /// A random actor identity for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.short_hex())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor:{}", self.short_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(ActorId::derive(b"trailhead"), ActorId::derive(b"trailhead"));
        assert_ne!(ActorId::derive(b"trailhead"), ActorId::derive(b"relayer"));
    }

    #[test]
    fn ephemeral_ids_are_unique() {
        assert_ne!(ActorId::ephemeral(), ActorId::ephemeral());
    }

    #[test]
    fn display_format() {
        let id = ActorId::from_raw([0xab; 32]);
        assert_eq!(format!("{id}"), "actor:abababab");
    }
}
