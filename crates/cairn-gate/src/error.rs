use cairn_ledger::LedgerError;
use cairn_trails::TrailError;

use crate::role::Role;

/// Errors surfaced by the ledger facade.
///
/// Authorization, the frozen barrier, and timing checks originate here;
/// everything downstream is wrapped transparently so callers match on the
/// underlying taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("caller does not hold the {role} role")]
    Unauthorized { role: Role },

    #[error("ledger is frozen")]
    Frozen,

    #[error("freeze delay not elapsed: height {at_height} is before {required}")]
    FreezeDelayNotElapsed { at_height: u64, required: u64 },

    #[error("batch of {requested} items exceeds limit of {max}")]
    BatchTooLarge { requested: usize, max: usize },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Trail(#[from] TrailError),
}
