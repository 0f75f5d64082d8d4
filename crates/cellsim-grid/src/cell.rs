//! A single grid cell with a current and a staged state.

use cellsim_types::{CellState, Position};

/// One cell of a [`Grid`](crate::Grid).
///
/// Rules read `current` and write `next`. Only
/// [`Grid::apply_next_states`](crate::Grid::apply_next_states) moves a staged
/// value into `current`, and it clears the staged slot as it does so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<S> {
    current: S,
    next: Option<S>,
    row: usize,
    col: usize,
}

impl<S: CellState> Cell<S> {
    /// Create a cell at `(row, col)` holding `state` with nothing staged.
    pub const fn new(row: usize, col: usize, state: S) -> Self {
        Self {
            current: state,
            next: None,
            row,
            col,
        }
    }

    /// The state visible to rules during the current step.
    pub const fn current(&self) -> S {
        self.current
    }

    /// The staged state, if one has been written this step.
    pub const fn next(&self) -> Option<S> {
        self.next
    }

    /// Row index of this cell.
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Column index of this cell.
    pub const fn col(&self) -> usize {
        self.col
    }

    /// Position of this cell.
    pub const fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Stage the state this cell takes at the next commit.
    pub fn set_next(&mut self, state: S) {
        self.next = Some(state);
    }

    /// Overwrite the current state directly and drop anything staged.
    ///
    /// Used only while laying out an initial configuration.
    pub(crate) fn reset(&mut self, state: S) {
        self.current = state;
        self.next = None;
    }

    /// Move the staged state into `current`.
    ///
    /// A cell with nothing staged keeps its state, so committing twice in a
    /// row is a no-op the second time.
    pub(crate) fn commit(&mut self) {
        if let Some(next) = self.next.take() {
            self.current = next;
        }
    }
}
