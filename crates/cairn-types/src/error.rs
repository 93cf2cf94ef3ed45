/// Errors from parsing or constructing foundation types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, actual {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
