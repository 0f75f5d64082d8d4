//! The starting structure placed at the center of the grid.
//!
//! ```text
//! s s s s s      s  sheath     C  core
//! s T H C s      H  head       T  tail
//! s C s C x      x  cap (Langton) or sheath (Tempesti)
//! s C C C s
//! s s s s s
//! ```
//!
//! The eight-cell core ring carries one signal clockwise. The Langton seed's
//! cap sits beside the ring's east junction and grows the arm eastward.

use cellsim_core::SimulationError;
use cellsim_grid::Grid;
use cellsim_types::{LoopState, Position};
use tracing::debug;
use LoopState::{Cap, Core, Head, Sheath, Tail};

use crate::error::LoopError;
use crate::rule::LoopVariant;

/// Side length of the seed block.
pub const SEED_SIZE: usize = 5;

/// Number of core cells in the seed ring; one revolution takes this many steps.
pub const RING_LENGTH: u64 = 8;

const RING: [[LoopState; SEED_SIZE]; SEED_SIZE] = [
    [Sheath, Sheath, Sheath, Sheath, Sheath],
    [Sheath, Tail, Head, Core, Sheath],
    [Sheath, Core, Sheath, Core, Sheath],
    [Sheath, Core, Core, Core, Sheath],
    [Sheath, Sheath, Sheath, Sheath, Sheath],
];

const ARM_TIP: (usize, usize) = (2, 4);

/// Top-left corner of the centered seed on a `rows` x `cols` grid.
pub fn origin(rows: usize, cols: usize) -> Result<Position, LoopError> {
    if rows < SEED_SIZE || cols < SEED_SIZE {
        return Err(LoopError::GridTooSmall {
            rows,
            cols,
            min: SEED_SIZE,
        });
    }
    Ok(Position::new(
        rows.saturating_sub(SEED_SIZE) / 2,
        cols.saturating_sub(SEED_SIZE) / 2,
    ))
}

/// The seed's state at block coordinate `(row, col)`.
pub fn seed_state(variant: LoopVariant, row: usize, col: usize) -> Option<LoopState> {
    if variant.grows() && (row, col) == ARM_TIP {
        return Some(Cap);
    }
    RING.get(row).and_then(|cells| cells.get(col)).copied()
}

/// Write the seed for `variant` at the center of `grid`.
pub fn place(
    grid: &mut Grid<LoopState>,
    variant: LoopVariant,
) -> Result<Position, SimulationError> {
    let top_left = origin(grid.rows(), grid.cols())?;
    for row in 0..SEED_SIZE {
        for col in 0..SEED_SIZE {
            let (Some(state), Some(target_row), Some(target_col)) = (
                seed_state(variant, row, col),
                top_left.row.checked_add(row),
                top_left.col.checked_add(col),
            ) else {
                continue;
            };
            grid.set_state(Position::new(target_row, target_col), state)?;
        }
    }
    debug!(?variant, origin = %top_left, "Seed placed");
    Ok(top_left)
}
