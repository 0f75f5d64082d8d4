//! Error types for the `cellsim-grid` crate.
//!
//! All fallible grid operations return [`GridError`].

/// Errors that can occur while building, configuring, or updating a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A grid was requested with a zero or overflowing dimension.
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },

    /// The requested operation is not available on this grid.
    #[error("unsupported grid operation: {operation}")]
    UnsupportedOperation {
        /// Description of the rejected operation.
        operation: String,
    },

    /// Growing the grid would exceed its configured cell budget.
    #[error("grid growth to {requested} cells exceeds the limit of {max_cells}")]
    GrowthLimit {
        /// Cell count the growth step would have produced.
        requested: usize,
        /// Maximum number of cells the grid may hold.
        max_cells: usize,
    },

    /// A bulk staging call supplied the wrong number of states.
    #[error("staged {actual} states for a grid of {expected} cells")]
    StagedLengthMismatch {
        /// Number of cells in the grid.
        expected: usize,
        /// Number of states supplied.
        actual: usize,
    },

    /// A coordinate lies outside the grid.
    #[error("position ({row}, {col}) is outside the grid")]
    OutOfBounds {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// Arithmetic overflow during a checked coordinate calculation.
    #[error("arithmetic overflow in grid calculation")]
    ArithmeticOverflow,
}
