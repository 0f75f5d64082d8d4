//! Death conditions.
//!
//! An agent dies when its sugar runs out, when its spice runs out (only
//! while spice is enabled), or when it grows older than a positive
//! maximum age. Whatever it still holds leaves the economy.

use cellsim_types::Resource;

use crate::agent::Agent;
use crate::config::EconomyConfig;

/// The cause of an agent's death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// A tracked resource reached zero.
    Starvation(Resource),
    /// The agent's age exceeded the configured maximum.
    OldAge,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation(Resource::Sugar) => write!(f, "sugar_starvation"),
            Self::Starvation(Resource::Spice) => write!(f, "spice_starvation"),
            Self::OldAge => write!(f, "old_age"),
        }
    }
}

/// Check whether `agent` meets any death condition.
pub const fn check_death(agent: &Agent, config: &EconomyConfig) -> Option<DeathCause> {
    if agent.sugar == 0 {
        return Some(DeathCause::Starvation(Resource::Sugar));
    }
    if config.spice_enabled && agent.spice == 0 {
        return Some(DeathCause::Starvation(Resource::Spice));
    }
    if config.max_age > 0 && agent.age > config.max_age {
        return Some(DeathCause::OldAge);
    }
    None
}
