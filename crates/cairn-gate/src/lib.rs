//! External-facing facade for the Cairn segment ledger.
//!
//! [`LedgerGate`] is the only path to the ledger -- no bypass is possible.
//! Every mutating call runs the same check order: frozen barrier, caller
//! role, validation, delegation, epoch observation, event emission. All
//! state lives behind a single lock, giving the strictly serialized
//! single-writer execution model: each call either applies all of its state
//! changes or fails before the first one.

pub mod config;
pub mod error;
pub mod gate;
pub mod role;

pub use config::{limits, LedgerConfig};
pub use error::GateError;
pub use gate::LedgerGate;
pub use role::{Role, Roles};
