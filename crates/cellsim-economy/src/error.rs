//! Error types for the cellsim-economy crate.
//!
//! Every economy operation returns a typed error rather than panicking.
//! Errors cross into the shared simulation error through the
//! [`From`] impl at the bottom of this module: configuration problems stay
//! configuration errors, everything else is an invariant violation.

use cellsim_core::{ConfigError, SimulationError};
use cellsim_grid::GridError;
use cellsim_ledger::LedgerError;
use cellsim_types::{AgentId, LoanId, Position};

/// Errors that can occur while building or stepping an economy.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// The economy parameters were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An agent could not be constructed.
    #[error("invalid agent: {reason}")]
    InvalidAgent {
        /// Description of what was wrong with the agent.
        reason: String,
    },

    /// Agent with the given ID was not found in the roster.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Loan with the given ID is not outstanding.
    #[error("loan not outstanding: {0}")]
    LoanNotFound(LoanId),

    /// Two agents claimed the same cell.
    #[error("cell {position} already holds {occupant}")]
    CellOccupied {
        /// The contested cell.
        position: Position,
        /// The agent already there.
        occupant: AgentId,
    },

    /// Attempted to remove more of a resource than the holder has.
    #[error("insufficient {what}: wanted {requested} but only have {available}")]
    Insufficient {
        /// What was being removed.
        what: &'static str,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A ledger entry was rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The end-of-step audit found resources created or destroyed.
    #[error("{0}")]
    Imbalance(String),

    /// A grid operation failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl EconomyError {
    /// Build an [`EconomyError::ArithmeticOverflow`] from any description.
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }
}

impl From<EconomyError> for SimulationError {
    fn from(err: EconomyError) -> Self {
        match err {
            EconomyError::Config(source) => Self::Config { source },
            EconomyError::Grid(source) => Self::Grid { source },
            other => Self::invariant(other.to_string()),
        }
    }
}
