//! Error types shared by every simulation.

use cellsim_grid::GridError;

use crate::config::ConfigError;

/// Errors surfaced by constructing or stepping a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configuration was rejected.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A grid operation failed.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },

    /// An internal consistency check failed. Never recovered.
    #[error("invariant violated: {context}")]
    Invariant {
        /// What was found to be inconsistent.
        context: String,
    },

    /// Every cell's rule failed during one planning pass.
    #[error("all {failures} cells failed their rule at tick {tick}")]
    AllCellsFailed {
        /// Tick being planned.
        tick: u64,
        /// Number of failed cells.
        failures: usize,
    },

    /// The step counter would overflow.
    #[error("tick counter overflow")]
    TickOverflow,
}

impl SimulationError {
    /// Build an [`SimulationError::Invariant`] from any description.
    pub fn invariant(context: impl Into<String>) -> Self {
        Self::Invariant {
            context: context.into(),
        }
    }
}

/// A transition rule could not decide a cell's next state.
///
/// Recovered by holding the cell at its current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cell rule failed: {reason}")]
pub struct CellRuleError {
    /// Why the rule failed.
    pub reason: String,
}

impl CellRuleError {
    /// Create a rule failure with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
