//! Errors raised while laying out a signal loop.

use cellsim_core::{ConfigError, SimulationError};
use cellsim_types::{CellShape, ModelKind};

/// A loop configuration that cannot host the seed or the transition table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoopError {
    /// The configured model is not one of the loop models.
    #[error("model {0} is not a signal loop")]
    NotALoopModel(ModelKind),

    /// The grid cannot hold the seed.
    #[error("grid {rows}x{cols} is smaller than the {min}x{min} seed")]
    GridTooSmall {
        /// Configured rows.
        rows: usize,
        /// Configured columns.
        cols: usize,
        /// Seed side length.
        min: usize,
    },

    /// Transition tables read the four cardinal neighbors of square cells.
    #[error("signal loops need square cells, not {0:?}")]
    UnsupportedShape(CellShape),

    /// Only explicit cell edits may be laid over the seed.
    #[error("initializer {0} cannot be combined with the loop seed")]
    UnsupportedInitializer(&'static str),
}

impl From<LoopError> for SimulationError {
    fn from(err: LoopError) -> Self {
        ConfigError::invalid(err.to_string()).into()
    }
}
