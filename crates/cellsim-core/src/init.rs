//! Grid construction and initial layout resolution.
//!
//! [`build_grid`] turns the `grid` section into a configured [`Grid`];
//! [`initial_states`] turns the `initial` section into one state per cell,
//! drawing from the simulation's generator for the random layouts.

use cellsim_grid::{Cell, Grid};
use cellsim_types::{CellState, EdgePolicy, Position};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::{ConfigError, SimulationConfig};
use crate::error::SimulationError;

/// Build an all-default grid from the `grid` section.
///
/// An infinite edge produces a growable grid capped at `max_cells`.
pub fn build_grid<S: CellState>(config: &SimulationConfig) -> Result<Grid<S>, SimulationError> {
    let section = &config.grid;
    let mut grid = if section.edge == EdgePolicy::Infinite {
        Grid::growable(section.height, section.width, section.max_cells)?
    } else {
        Grid::new(section.height, section.width)?
    };
    grid.configure(section.edge, section.shape, section.neighbors)?;
    Ok(grid)
}

/// Resolve the initial layout into one state per cell, row-major.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if any state code is unknown or an
/// explicit cell lies outside the grid.
pub fn initial_states<S, R>(config: &SimulationConfig, rng: &mut R) -> Result<Vec<S>, ConfigError>
where
    S: CellState,
    R: Rng + ?Sized,
{
    let rows = config.grid.height;
    let cols = config.grid.width;
    let cells = config
        .cell_count()
        .ok_or_else(|| ConfigError::invalid("grid dimensions overflow"))?;
    let mut states = vec![S::default(); cells];
    let initial = &config.initial;

    if let Some(specs) = &initial.cells {
        let mut problems = Vec::new();
        for spec in specs {
            let position = spec.position();
            let slot = (position.row < rows && position.col < cols)
                .then(|| position.index(cols))
                .flatten()
                .and_then(|index| states.get_mut(index));
            match (slot, S::from_code(spec.state)) {
                (Some(slot), Some(state)) => *slot = state,
                (None, _) => problems.push(format!("cell {position} is outside the grid")),
                (_, None) => problems.push(format!("unknown state code {}", spec.state)),
            }
        }
        if !problems.is_empty() {
            return Err(ConfigError::Invalid { problems });
        }
    } else if let Some(codes) = &initial.states {
        if codes.len() != cells {
            return Err(ConfigError::invalid(format!(
                "flat state list has {} entries for {cells} cells",
                codes.len()
            )));
        }
        for (slot, code) in states.iter_mut().zip(codes) {
            *slot = lookup(*code)?;
        }
    } else if let Some(counts) = &initial.random_by_count {
        let mut order: Vec<usize> = (0..cells).collect();
        order.shuffle(rng);
        let mut free = order.into_iter();
        for (code, count) in counts {
            let state = lookup::<S>(*code)?;
            let placed: Vec<usize> = free.by_ref().take(*count).collect();
            if placed.len() < *count {
                return Err(ConfigError::invalid(format!(
                    "not enough cells to place {count} of state {code}"
                )));
            }
            for index in placed {
                if let Some(slot) = states.get_mut(index) {
                    *slot = state;
                }
            }
        }
    } else if let Some(proportions) = &initial.random_by_proportion {
        let table = proportions
            .iter()
            .map(|(code, share)| lookup::<S>(*code).map(|state| (state, *share)))
            .collect::<Result<Vec<_>, _>>()?;
        for slot in &mut states {
            let draw: f64 = rng.random();
            let mut cumulative = 0.0_f64;
            for (state, share) in &table {
                cumulative += share;
                if draw < cumulative {
                    *slot = *state;
                    break;
                }
            }
        }
    }

    debug!(cells, "Resolved initial layout");
    Ok(states)
}

/// Write `states` into `grid` row-major, replacing every current state.
pub fn apply_states<S: CellState>(grid: &mut Grid<S>, states: &[S]) -> Result<(), SimulationError> {
    if states.len() != grid.len() {
        return Err(SimulationError::invariant(format!(
            "layout has {} states for {} cells",
            states.len(),
            grid.len()
        )));
    }
    let positions: Vec<Position> = grid.cells().iter().map(Cell::position).collect();
    for (position, state) in positions.into_iter().zip(states) {
        grid.set_state(position, *state)?;
    }
    Ok(())
}

/// Build the grid and lay out the initial states in one call.
pub fn build_initial_grid<S, R>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Grid<S>, SimulationError>
where
    S: CellState,
    R: Rng + ?Sized,
{
    config.validate::<S>()?;
    let mut grid = build_grid::<S>(config)?;
    let states = initial_states::<S, R>(config, rng)?;
    apply_states(&mut grid, &states)?;
    Ok(grid)
}

fn lookup<S: CellState>(code: i32) -> Result<S, ConfigError> {
    S::from_code(code).ok_or_else(|| ConfigError::invalid(format!("unknown state code {code}")))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cellsim_types::{FireState, LifeState};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::CellSpec;

    fn config(width: usize, height: usize) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.grid.width = width;
        config.grid.height = height;
        config
    }

    #[test]
    fn explicit_cells_placed() {
        let mut config = config(3, 2);
        config.initial.cells = Some(vec![CellSpec {
            row: 1,
            col: 2,
            state: 1,
        }]);
        let mut rng = StdRng::seed_from_u64(42);
        let states = initial_states::<LifeState, _>(&config, &mut rng).ok();
        let mut expected = vec![LifeState::Empty; 6];
        if let Some(last) = expected.last_mut() {
            *last = LifeState::Alive;
        }
        assert_eq!(states, Some(expected));
    }

    #[test]
    fn random_count_is_exact() {
        let mut config = config(10, 10);
        config.initial.random_by_count = Some(BTreeMap::from([(1, 30), (2, 5)]));
        let mut rng = StdRng::seed_from_u64(42);
        let states = initial_states::<FireState, _>(&config, &mut rng).unwrap_or_default();
        assert_eq!(states.iter().filter(|s| **s == FireState::Tree).count(), 30);
        assert_eq!(states.iter().filter(|s| **s == FireState::Burning).count(), 5);
    }

    #[test]
    fn random_layouts_replay_with_same_seed() {
        let mut config = config(12, 12);
        config.initial.random_by_proportion = Some(BTreeMap::from([(1, 0.4)]));
        let first =
            initial_states::<LifeState, _>(&config, &mut StdRng::seed_from_u64(9)).ok();
        let second =
            initial_states::<LifeState, _>(&config, &mut StdRng::seed_from_u64(9)).ok();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn full_proportion_fills_grid() {
        let mut config = config(4, 4);
        config.initial.random_by_proportion = Some(BTreeMap::from([(1, 1.0)]));
        let mut rng = StdRng::seed_from_u64(1);
        let states = initial_states::<LifeState, _>(&config, &mut rng).unwrap_or_default();
        assert!(states.iter().all(|s| *s == LifeState::Alive));
    }

    #[test]
    fn unknown_flat_code_rejected() {
        let mut config = config(2, 1);
        config.initial.states = Some(vec![0, 4]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(initial_states::<LifeState, _>(&config, &mut rng).is_err());
    }

    #[test]
    fn infinite_edge_builds_growable_grid() {
        let mut config = config(5, 5);
        config.grid.edge = EdgePolicy::Infinite;
        let grid = build_grid::<LifeState>(&config);
        assert!(grid.as_ref().is_ok_and(Grid::is_growable));
    }
}
