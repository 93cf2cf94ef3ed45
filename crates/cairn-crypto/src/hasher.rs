/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag (e.g., `"cairn-link-v1"`,
/// `"cairn-epoch-v1"`) that is prepended to every hash computation. This
/// prevents cross-type hash collisions: a chain link and an epoch
/// fingerprint computed over identical bytes will produce different hashes.
pub struct DomainHasher {
    domain: &'static str,
}

impl DomainHasher {
    /// Hasher for segment chain links.
    pub const LINK: Self = Self {
        domain: "cairn-link-v1",
    };
    /// Hasher for epoch fingerprints.
    pub const EPOCH: Self = Self {
        domain: "cairn-epoch-v1",
    };
    /// Hasher for ledger event integrity.
    pub const EVENT: Self = Self {
        domain: "cairn-event-v1",
    };
    /// Hasher for deployment fingerprints.
    pub const DEPLOYMENT: Self = Self {
        domain: "cairn-deployment-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash a serializable value as JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<[u8; 32], HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Start an incremental hash with the domain tag already absorbed.
    pub fn streaming(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &[u8; 32]) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
