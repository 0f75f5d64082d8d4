//! The closed set of models a configuration can name.
//!
//! [`AnySimulation`] wraps one concrete simulation and forwards to it, so a
//! collaborator can drive any model without knowing its state alphabet.
//! Queries that expose states return integer codes, state names, or color
//! tokens.

use std::collections::BTreeMap;

use cellsim_automata::{FireSimulation, LifeSimulation, SegregationSimulation};
use cellsim_core::{Simulation, SimulationConfig, SimulationError, StepReport};
use cellsim_economy::{EconomyStats, SugarscapeSimulation};
use cellsim_loops::LoopSimulation;
use cellsim_types::{CellState, ModelKind};
use tracing::info;

/// Any of the shipped simulations.
#[derive(Debug, Clone)]
pub enum AnySimulation {
    /// Game of Life or a rule-string variant.
    Life(LifeSimulation),
    /// Spreading fire.
    Fire(FireSimulation),
    /// Schelling segregation.
    Segregation(SegregationSimulation),
    /// Sugar/spice agent economy.
    Sugarscape(Box<SugarscapeSimulation>),
    /// Langton-style or Tempesti-style signal loop.
    Loop(LoopSimulation),
}

/// Forward `$body` to the wrapped simulation, bound as `$sim`.
macro_rules! dispatch {
    ($self:expr, $sim:ident => $body:expr) => {
        match $self {
            AnySimulation::Life($sim) => $body,
            AnySimulation::Fire($sim) => $body,
            AnySimulation::Segregation($sim) => $body,
            AnySimulation::Sugarscape($sim) => $body,
            AnySimulation::Loop($sim) => $body,
        }
    };
}

impl AnySimulation {
    /// Build the simulation the configuration's model tag names.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let model = config.simulation.model;
        let simulation = match model {
            ModelKind::GameOfLife | ModelKind::LifeLike => {
                Self::Life(LifeSimulation::new(config)?)
            }
            ModelKind::SpreadingFire => Self::Fire(FireSimulation::new(config)?),
            ModelKind::Segregation => Self::Segregation(SegregationSimulation::new(config)?),
            ModelKind::Sugarscape => {
                Self::Sugarscape(Box::new(SugarscapeSimulation::new(config)?))
            }
            ModelKind::LangtonLoop | ModelKind::TempestiLoop => {
                Self::Loop(LoopSimulation::new(config)?)
            }
        };
        info!(model = %model, seed = config.simulation.seed, "Simulation selected");
        Ok(simulation)
    }

    /// Which model is running.
    pub fn kind(&self) -> ModelKind {
        dispatch!(self, sim => sim.kind())
    }

    /// Advance one step.
    pub fn step(&mut self) -> Result<StepReport, SimulationError> {
        dispatch!(self, sim => sim.step())
    }

    /// Rebuild from `config`.
    ///
    /// The model tag may change; the wrapped simulation is replaced.
    pub fn reinitialize(&mut self, config: &SimulationConfig) -> Result<(), SimulationError> {
        if config.simulation.model == self.kind() {
            dispatch!(self, sim => sim.reinitialize(config))
        } else {
            *self = Self::from_config(config)?;
            Ok(())
        }
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        dispatch!(self, sim => sim.tick())
    }

    /// Grid dimensions as `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        dispatch!(self, sim => (sim.grid().rows(), sim.grid().cols()))
    }

    /// State codes of every cell, row by row.
    pub fn state_map(&self) -> Vec<Vec<i32>> {
        dispatch!(self, sim => sim.state_map())
    }

    /// Color tokens of every cell, row by row.
    pub fn color_map(&self) -> Vec<Vec<String>> {
        dispatch!(self, sim => sim.color_map())
    }

    /// Number of cells in each state, keyed by state code.
    pub fn population_by_code(&self) -> BTreeMap<i32, usize> {
        dispatch!(self, sim => keyed(sim.population(), |state| state.code()))
    }

    /// Number of cells in each state, keyed by state name.
    pub fn population_by_name(&self) -> BTreeMap<String, usize> {
        dispatch!(self, sim => keyed(sim.population(), |state| state.name().to_owned()))
    }

    /// Activity counters of the latest economy step, for economy models.
    pub fn economy_stats(&self) -> Option<EconomyStats> {
        match self {
            Self::Sugarscape(sim) => Some(sim.last_step()),
            _ => None,
        }
    }
}

fn keyed<S, K, F>(population: BTreeMap<S, usize>, key: F) -> BTreeMap<K, usize>
where
    S: CellState,
    K: Ord,
    F: Fn(S) -> K,
{
    population
        .into_iter()
        .map(|(state, count)| (key(state), count))
        .collect()
}
