//! The cell arena and its topology.
//!
//! A [`Grid`] owns every [`Cell`] in row-major order and composes one
//! [`EdgeStrategy`] with one [`NeighborhoodStrategy`]. Neighbor queries map
//! each offset through the edge strategy and silently drop rejected ones.
//!
//! Updates follow a two-phase protocol: rules stage next states with
//! [`Grid::stage`] or [`Grid::stage_all`] while reading only current states,
//! then [`Grid::apply_next_states`] commits every cell at once.

use std::collections::BTreeMap;

use cellsim_types::{CellShape, CellState, EdgePolicy, NeighborArrangement, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cell::Cell;
use crate::edge::EdgeStrategy;
use crate::error::GridError;
use crate::neighborhood::{NeighborhoodStrategy, ParityLock};

/// Default cell budget for growable grids.
pub const DEFAULT_MAX_CELLS: usize = 1 << 20;

/// How far existing content moved when a growable grid expanded.
///
/// Owners that store positions add these shifts to stay aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GrowthOffset {
    /// Rows inserted above the old content.
    pub row_shift: usize,
    /// Columns inserted left of the old content.
    pub col_shift: usize,
}

impl GrowthOffset {
    /// Translate a position from before the growth into the grown grid.
    pub const fn apply(self, position: Position) -> Option<Position> {
        match (
            position.row.checked_add(self.row_shift),
            position.col.checked_add(self.col_shift),
        ) {
            (Some(row), Some(col)) => Some(Position::new(row, col)),
            _ => None,
        }
    }
}

/// A rectangular grid of cells with pluggable topology.
#[derive(Debug, Clone)]
pub struct Grid<S> {
    rows: usize,
    cols: usize,
    cells: Vec<Cell<S>>,
    edge: EdgeStrategy,
    neighborhood: NeighborhoodStrategy,
    growable: bool,
    max_cells: usize,
}

impl<S: CellState> Grid<S> {
    /// Create a fixed-size grid filled with the default state.
    ///
    /// The grid starts bounded with a Moore neighborhood.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        let total = checked_area(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: blank_cells(rows, cols),
            edge: EdgeStrategy::Bounded,
            neighborhood: NeighborhoodStrategy::Moore,
            growable: false,
            max_cells: total,
        })
    }

    /// Create a grid that may grow up to `max_cells` cells.
    pub fn growable(rows: usize, cols: usize, max_cells: usize) -> Result<Self, GridError> {
        let total = checked_area(rows, cols)?;
        if total > max_cells {
            return Err(GridError::GrowthLimit {
                requested: total,
                max_cells,
            });
        }
        let mut grid = Self::new(rows, cols)?;
        grid.growable = true;
        grid.max_cells = max_cells;
        Ok(grid)
    }

    /// Select edge handling and neighborhood from the three topology enums.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnsupportedOperation`] when an infinite edge is
    /// requested on a fixed-size grid.
    pub fn configure(
        &mut self,
        edge: EdgePolicy,
        shape: CellShape,
        arrangement: NeighborArrangement,
    ) -> Result<(), GridError> {
        self.set_strategies(
            EdgeStrategy::from(edge),
            NeighborhoodStrategy::for_shape(shape, arrangement),
        )
    }

    /// Install explicit strategies, for example a composite neighborhood.
    pub fn set_strategies(
        &mut self,
        edge: EdgeStrategy,
        neighborhood: NeighborhoodStrategy,
    ) -> Result<(), GridError> {
        if edge.requires_growth() && !self.growable {
            return Err(GridError::UnsupportedOperation {
                operation: "infinite edge on a fixed-size grid".to_owned(),
            });
        }
        self.edge = edge;
        self.neighborhood = neighborhood;
        Ok(())
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells; always `rows * cols`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells. Never true for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The active edge strategy.
    pub const fn edge(&self) -> EdgeStrategy {
        self.edge
    }

    /// The active neighborhood strategy.
    pub const fn neighborhood(&self) -> &NeighborhoodStrategy {
        &self.neighborhood
    }

    /// Whether the grid may grow.
    pub const fn is_growable(&self) -> bool {
        self.growable
    }

    /// Maximum number of cells the grid may hold.
    pub const fn max_cells(&self) -> usize {
        self.max_cells
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell<S>] {
        &self.cells
    }

    /// Whether `(row, col)` lies inside the grid.
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// The cell at `(row, col)`, if in range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell<S>> {
        let index = self.index_of(row, col)?;
        self.cells.get(index)
    }

    /// The cell at `position`, if in range.
    pub fn cell_at(&self, position: Position) -> Option<&Cell<S>> {
        self.cell(position.row, position.col)
    }

    /// Current state at `position`, if in range.
    pub fn state_at(&self, position: Position) -> Option<S> {
        self.cell_at(position).map(Cell::current)
    }

    /// Map a signed coordinate through the edge strategy.
    pub fn resolve(&self, row: isize, col: isize) -> Option<Position> {
        self.edge.resolve(self.rows, self.cols, row, col)
    }

    /// Resolve `position` shifted by `(d_row, d_col)` through the edge strategy.
    pub fn offset(&self, position: Position, d_row: isize, d_col: isize) -> Option<Position> {
        let row = isize::try_from(position.row).ok()?.checked_add(d_row)?;
        let col = isize::try_from(position.col).ok()?.checked_add(d_col)?;
        self.resolve(row, col)
    }

    /// Positions of the neighbors of `(row, col)` after edge resolution.
    ///
    /// Rejected offsets are dropped, never substituted.
    pub fn neighbor_positions(&self, row: usize, col: usize) -> Vec<Position> {
        let origin = Position::new(row, col);
        self.neighborhood
            .offsets(row, col)
            .into_iter()
            .filter_map(|(d_row, d_col)| self.offset(origin, d_row, d_col))
            .collect()
    }

    /// Neighbor cells of `(row, col)`.
    pub fn neighbors(&self, row: usize, col: usize) -> Vec<&Cell<S>> {
        self.neighbor_positions(row, col)
            .into_iter()
            .filter_map(|position| self.cell_at(position))
            .collect()
    }

    /// Number of neighbors of `(row, col)` currently in `state`.
    pub fn count_neighbors(&self, row: usize, col: usize, state: S) -> usize {
        self.neighbors(row, col)
            .into_iter()
            .filter(|cell| cell.current() == state)
            .count()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Overwrite the current state of one cell, dropping anything staged.
    ///
    /// Intended for initial layout and reinitialization, not for rules.
    pub fn set_state(&mut self, position: Position, state: S) -> Result<(), GridError> {
        self.cell_mut(position)?.reset(state);
        Ok(())
    }

    /// Reset every cell to `state`.
    pub fn fill(&mut self, state: S) {
        for cell in &mut self.cells {
            cell.reset(state);
        }
    }

    /// Stage the next state of one cell.
    pub fn stage(&mut self, position: Position, state: S) -> Result<(), GridError> {
        self.cell_mut(position)?.set_next(state);
        Ok(())
    }

    /// Stage next states for every cell in row-major order.
    pub fn stage_all(&mut self, states: Vec<S>) -> Result<(), GridError> {
        if states.len() != self.cells.len() {
            return Err(GridError::StagedLengthMismatch {
                expected: self.cells.len(),
                actual: states.len(),
            });
        }
        for (cell, state) in self.cells.iter_mut().zip(states) {
            cell.set_next(state);
        }
        Ok(())
    }

    /// Staged states in row-major order.
    pub fn staged_states(&self) -> Vec<Option<S>> {
        self.cells.iter().map(Cell::next).collect()
    }

    /// Commit every staged state. Cells with nothing staged keep their state.
    pub fn apply_next_states(&mut self) {
        for cell in &mut self.cells {
            cell.commit();
        }
    }

    // -----------------------------------------------------------------------
    // Queries over the whole grid
    // -----------------------------------------------------------------------

    /// Current states in row-major order.
    pub fn states(&self) -> Vec<S> {
        self.cells.iter().map(Cell::current).collect()
    }

    /// Integer codes of the current states, row by row.
    pub fn state_codes(&self) -> Vec<Vec<i32>> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().map(|cell| cell.current().code()).collect())
            .collect()
    }

    /// Count of cells per state, including states with no cells.
    pub fn population(&self) -> BTreeMap<S, usize> {
        let mut counts: BTreeMap<S, usize> = S::ALL.iter().map(|state| (*state, 0)).collect();
        for cell in &self.cells {
            let entry = counts.entry(cell.current()).or_insert(0);
            *entry = entry.saturating_add(1);
        }
        counts
    }

    // -----------------------------------------------------------------------
    // Growth
    // -----------------------------------------------------------------------

    /// Grow the grid when non-default content lies within `margin` cells of
    /// an edge.
    ///
    /// Each round doubles the touched axes and splits the new rows or columns
    /// evenly, the smaller half before the old content. When the neighborhood
    /// follows row or `row + col` parity, the shift before the content is
    /// rounded up to keep that parity, so adjacency is unchanged by growth.
    /// Rounds repeat until the content clears the margin. Staged states are
    /// discarded.
    ///
    /// Returns the accumulated shift, or `None` when no growth was needed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnsupportedOperation`] on a fixed-size grid and
    /// [`GridError::GrowthLimit`] when the result would exceed `max_cells`.
    pub fn grow_if_needed(&mut self, margin: usize) -> Result<Option<GrowthOffset>, GridError> {
        if !self.growable {
            return Err(GridError::UnsupportedOperation {
                operation: "growth of a fixed-size grid".to_owned(),
            });
        }

        let mut total = GrowthOffset::default();
        let mut grew = false;

        while let Some(bounds) = self.content_bounds() {
            let grow_rows = bounds.min_row < margin
                || bounds.max_row.saturating_add(margin) >= self.rows;
            let grow_cols = bounds.min_col < margin
                || bounds.max_col.saturating_add(margin) >= self.cols;
            if !grow_rows && !grow_cols {
                break;
            }

            let added_rows = if grow_rows { self.rows } else { 0 };
            let added_cols = if grow_cols { self.cols } else { 0 };
            let new_rows = self
                .rows
                .checked_add(added_rows)
                .ok_or(GridError::ArithmeticOverflow)?;
            let new_cols = self
                .cols
                .checked_add(added_cols)
                .ok_or(GridError::ArithmeticOverflow)?;
            let requested = checked_area(new_rows, new_cols)?;
            if requested > self.max_cells {
                return Err(GridError::GrowthLimit {
                    requested,
                    max_cells: self.max_cells,
                });
            }

            let shift = aligned_shift(self.neighborhood.parity_lock(), added_rows, added_cols);
            self.rebuild(new_rows, new_cols, shift);
            total.row_shift = total.row_shift.saturating_add(shift.row_shift);
            total.col_shift = total.col_shift.saturating_add(shift.col_shift);
            grew = true;

            info!(
                rows = self.rows,
                cols = self.cols,
                row_shift = shift.row_shift,
                col_shift = shift.col_shift,
                "Grid grew to keep content away from the edge"
            );
        }

        Ok(grew.then_some(total))
    }

    fn rebuild(&mut self, rows: usize, cols: usize, shift: GrowthOffset) {
        let mut cells = Vec::with_capacity(rows.saturating_mul(cols));
        for row in 0..rows {
            for col in 0..cols {
                let state = row
                    .checked_sub(shift.row_shift)
                    .zip(col.checked_sub(shift.col_shift))
                    .and_then(|(old_row, old_col)| self.cell(old_row, old_col))
                    .map_or_else(S::default, Cell::current);
                cells.push(Cell::new(row, col, state));
            }
        }
        debug!(cells = cells.len(), "Rebuilt grid arena");
        self.rows = rows;
        self.cols = cols;
        self.cells = cells;
    }

    fn content_bounds(&self) -> Option<Bounds> {
        let background = S::default();
        let mut bounds: Option<Bounds> = None;
        for cell in self.cells.iter().filter(|cell| cell.current() != background) {
            let (row, col) = (cell.row(), cell.col());
            bounds = Some(match bounds {
                None => Bounds {
                    min_row: row,
                    max_row: row,
                    min_col: col,
                    max_col: col,
                },
                Some(b) => Bounds {
                    min_row: b.min_row.min(row),
                    max_row: b.max_row.max(row),
                    min_col: b.min_col.min(col),
                    max_col: b.max_col.max(col),
                },
            });
        }
        bounds
    }

    fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if !self.contains(row, col) {
            return None;
        }
        Position::new(row, col).index(self.cols)
    }

    fn cell_mut(&mut self, position: Position) -> Result<&mut Cell<S>, GridError> {
        let index = self
            .index_of(position.row, position.col)
            .ok_or(GridError::OutOfBounds {
                row: position.row,
                col: position.col,
            })?;
        self.cells.get_mut(index).ok_or(GridError::OutOfBounds {
            row: position.row,
            col: position.col,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_row: usize,
    max_row: usize,
    min_col: usize,
    max_col: usize,
}

fn checked_area(rows: usize, cols: usize) -> Result<usize, GridError> {
    if rows == 0 || cols == 0 {
        return Err(GridError::InvalidDimensions { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(GridError::InvalidDimensions { rows, cols })
}

fn blank_cells<S: CellState>(rows: usize, cols: usize) -> Vec<Cell<S>> {
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| Cell::new(row, col, S::default())))
        .collect()
}

/// Split added rows and columns, keeping the parities `lock` names even.
///
/// An odd half always comes from at least two added lines, so rounding it up
/// stays inside the added band.
fn aligned_shift(lock: ParityLock, added_rows: usize, added_cols: usize) -> GrowthOffset {
    let mut row_shift = added_rows.checked_div(2).unwrap_or(0);
    let mut col_shift = added_cols.checked_div(2).unwrap_or(0);
    if lock.row && is_odd(row_shift) {
        row_shift = row_shift.saturating_add(1);
    }
    if lock.diagonal && is_odd(row_shift ^ col_shift) {
        if is_odd(col_shift) {
            col_shift = col_shift.saturating_add(1);
        } else {
            row_shift = row_shift.saturating_add(1);
        }
    }
    GrowthOffset {
        row_shift,
        col_shift,
    }
}

const fn is_odd(value: usize) -> bool {
    value & 1 == 1
}
