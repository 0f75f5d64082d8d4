//! The contract every rule engine implements.

use std::collections::BTreeMap;

use cellsim_grid::{Grid, GrowthOffset};
use cellsim_types::{CellState, ModelKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::palette::Palette;

/// Build the generator a simulation draws all of its randomness from.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Outcome of one completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StepReport {
    /// Tick just completed.
    pub tick: u64,
    /// Cells whose rule failed and were held at their current state.
    pub failed_cells: usize,
    /// Shift applied to existing content if the grid grew this step.
    pub grown: Option<GrowthOffset>,
}

/// A cellular automaton over its own state alphabet.
///
/// Implementations own their grid and generator. Callers drive them with
/// [`Simulation::step`] and read results through the query methods.
pub trait Simulation {
    /// The model's closed state alphabet.
    type State: CellState;

    /// Which model this is.
    fn kind(&self) -> ModelKind;

    /// Advance one synchronous generation.
    fn step(&mut self) -> Result<StepReport, SimulationError>;

    /// Rebuild from `config`, reseeding the generator and resetting the tick.
    fn reinitialize(&mut self, config: &SimulationConfig) -> Result<(), SimulationError>;

    /// The grid in its current state.
    fn grid(&self) -> &Grid<Self::State>;

    /// The state to color mapping in use.
    fn palette(&self) -> &Palette<Self::State>;

    /// Number of completed steps.
    fn tick(&self) -> u64;

    /// Color tokens of every cell, row by row.
    fn color_map(&self) -> Vec<Vec<String>> {
        self.palette().color_map(self.grid())
    }

    /// State codes of every cell, row by row.
    fn state_map(&self) -> Vec<Vec<i32>> {
        self.grid().state_codes()
    }

    /// Number of cells in each state.
    fn population(&self) -> BTreeMap<Self::State, usize> {
        self.grid().population()
    }
}
