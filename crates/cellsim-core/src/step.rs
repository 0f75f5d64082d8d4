//! The two-phase step protocol.
//!
//! 1. **Plan** -- evaluate a rule for every cell against current states only
//!    and stage the results. A failing cell is logged and held at its
//!    current state. If every cell fails, nothing is staged.
//! 2. **Commit** -- [`Grid::apply_next_states`] swaps every staged state in.
//!
//! Keeping the phases separate makes transitions independent of the order
//! in which cells are visited.

use cellsim_grid::{Cell, Grid};
use cellsim_types::CellState;
use tracing::warn;

use crate::error::{CellRuleError, SimulationError};

/// Evaluate `rule` for every cell and stage the results.
///
/// Returns the number of cells whose rule failed.
///
/// # Errors
///
/// Returns [`SimulationError::AllCellsFailed`] when no cell succeeded, and
/// propagates grid errors from staging.
pub fn plan_next_states<S, F>(
    grid: &mut Grid<S>,
    tick: u64,
    mut rule: F,
) -> Result<usize, SimulationError>
where
    S: CellState,
    F: FnMut(&Grid<S>, &Cell<S>) -> Result<S, CellRuleError>,
{
    let mut failures = 0_usize;
    let next: Vec<S> = {
        let view: &Grid<S> = grid;
        view.cells()
            .iter()
            .map(|cell| match rule(view, cell) {
                Ok(state) => state,
                Err(err) => {
                    warn!(
                        tick,
                        row = cell.row(),
                        col = cell.col(),
                        reason = %err.reason,
                        "Cell rule failed; holding current state"
                    );
                    failures = failures.saturating_add(1);
                    cell.current()
                }
            })
            .collect()
    };

    if failures > 0 && failures == grid.len() {
        return Err(SimulationError::AllCellsFailed { tick, failures });
    }

    grid.stage_all(next)?;
    Ok(failures)
}

/// Plan with `rule` and commit in one call.
pub fn step_grid<S, F>(grid: &mut Grid<S>, tick: u64, rule: F) -> Result<usize, SimulationError>
where
    S: CellState,
    F: FnMut(&Grid<S>, &Cell<S>) -> Result<S, CellRuleError>,
{
    let failures = plan_next_states(grid, tick, rule)?;
    grid.apply_next_states();
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use cellsim_types::{LifeState, Position};

    use super::*;

    fn grid() -> Option<Grid<LifeState>> {
        let mut grid = Grid::new(3, 3).ok()?;
        grid.set_state(Position::new(1, 1), LifeState::Alive).ok()?;
        Some(grid)
    }

    #[test]
    fn planning_leaves_current_states_untouched() {
        let mut grid = grid().unwrap();
        let result = plan_next_states(&mut grid, 1, |view, cell| {
            Ok(if view.count_neighbors(cell.row(), cell.col(), LifeState::Alive) > 0 {
                LifeState::Alive
            } else {
                LifeState::Empty
            })
        });
        assert_eq!(result.ok(), Some(0));
        assert_eq!(grid.population().get(&LifeState::Alive), Some(&1));
        grid.apply_next_states();
        assert_eq!(grid.population().get(&LifeState::Alive), Some(&8));
    }

    #[test]
    fn failing_cell_is_held() {
        let mut grid = grid().unwrap();
        let result = step_grid(&mut grid, 1, |_, cell| {
            if cell.position() == Position::new(1, 1) {
                Err(CellRuleError::new("boom"))
            } else {
                Ok(LifeState::Empty)
            }
        });
        assert_eq!(result.ok(), Some(1));
        assert_eq!(grid.state_at(Position::new(1, 1)), Some(LifeState::Alive));
    }

    #[test]
    fn all_cells_failing_stages_nothing() {
        let mut grid = grid().unwrap();
        let result = plan_next_states(&mut grid, 4, |_, _| Err(CellRuleError::new("always")));
        assert!(matches!(
            result,
            Err(SimulationError::AllCellsFailed {
                tick: 4,
                failures: 9
            })
        ));
        assert!(grid.staged_states().iter().all(Option::is_none));
    }
}
