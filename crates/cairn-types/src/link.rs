use std::fmt;

use serde::{Deserialize, Serialize};

/// A chain link: the hash binding a segment to its predecessor.
///
/// Link `n` is computed over (link `n-1`, segment identity, value, ordinal,
/// recorded height); ordinal 1 links from [`ChainLink::zero`]. Storing the
/// link alongside each record lets any prefix of the ledger be verified
/// independently, given only the record list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainLink([u8; 32]);

impl ChainLink {
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The genesis sentinel: predecessor link of ordinal 1.
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
}

impl fmt::Debug for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainLink({})", self.short_hex())
    }
}

impl fmt::Display for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for ChainLink {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_genesis_sentinel() {
        assert!(ChainLink::zero().is_zero());
        assert!(!ChainLink::from_raw([1; 32]).is_zero());
    }

    #[test]
    fn serde_roundtrip() {
        let link = ChainLink::from_raw([7; 32]);
        let json = serde_json::to_string(&link).unwrap();
        let parsed: ChainLink = serde_json::from_str(&json).unwrap();
        assert_eq!(link, parsed);
    }
}
