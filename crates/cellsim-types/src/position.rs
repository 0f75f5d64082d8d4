//! Grid coordinates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A `(row, col)` coordinate inside a grid.
///
/// Agents hold positions rather than references to cells; the grid resolves
/// a position to its cell on demand.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Zero-based row index, growing downward.
    pub row: usize,
    /// Zero-based column index, growing rightward.
    pub col: usize,
}

impl Position {
    /// Create a position from a row and a column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another position, ignoring edge wrapping.
    pub const fn manhattan(self, other: Self) -> usize {
        self.row.abs_diff(other.row).saturating_add(self.col.abs_diff(other.col))
    }

    /// Row-major index of this position in a grid `cols` wide.
    ///
    /// Returns `None` if the multiplication overflows.
    pub const fn index(self, cols: usize) -> Option<usize> {
        match self.row.checked_mul(cols) {
            Some(base) => base.checked_add(self.col),
            None => None,
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
