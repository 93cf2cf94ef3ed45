use std::fmt;

use cairn_types::ActorId;

use crate::error::GateError;

/// The two privileged roles, fixed at initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sole writer for single-segment append, seal, freeze, trail and
    /// tag/weight management.
    Trailhead,
    /// Sole writer for batch append.
    Relayer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trailhead => write!(f, "trailhead"),
            Self::Relayer => write!(f, "relayer"),
        }
    }
}

/// The deployment's two capability holders. Role transfer is not exposed
/// here; if a deployment supports it, that is an external concern.
#[derive(Clone, Copy, Debug)]
pub struct Roles {
    trailhead: ActorId,
    relayer: ActorId,
}

impl Roles {
    pub fn new(trailhead: ActorId, relayer: ActorId) -> Self {
        Self { trailhead, relayer }
    }

    /// Check that `caller` holds `role`.
    pub fn require(&self, role: Role, caller: &ActorId) -> Result<(), GateError> {
        let holder = match role {
            Role::Trailhead => &self.trailhead,
            Role::Relayer => &self.relayer,
        };
        if caller == holder {
            Ok(())
        } else {
            Err(GateError::Unauthorized { role })
        }
    }

    pub fn trailhead(&self) -> &ActorId {
        &self.trailhead
    }

    pub fn relayer(&self) -> &ActorId {
        &self.relayer
    }
}
