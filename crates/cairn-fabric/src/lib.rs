//! State-change notifications for the Cairn segment ledger.
//!
//! Every successful mutation produces a [`LedgerEvent`] carrying the
//! operation's key identifiers and resulting counters, integrity-hashed so
//! observers can verify what they received. The [`EventBus`] fans events
//! out to filtered subscribers; delivery is fire-and-forget and consumption
//! is outside the core's scope.

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventFilter, EventStream};
pub use event::{EventId, EventKind, EventPayload, LedgerEvent};
