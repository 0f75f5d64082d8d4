//! Schelling segregation.
//!
//! An agent is satisfied when the share of same-group agents among its
//! occupied neighbors is at least `satisfaction`; an agent with no occupied
//! neighbors is satisfied. Each step every unsatisfied agent, in shuffled
//! order, moves to a randomly chosen cell that was empty when the step
//! began. No two agents claim the same cell, and a vacated cell does not
//! become available until the next step.

use cellsim_core::{
    ConfigError, Palette, Simulation, SimulationConfig, SimulationError, StepClock, StepReport,
    build_initial_grid, seeded_rng,
};
use cellsim_grid::{Cell, Grid};
use cellsim_types::{ModelKind, Position, SegregationState};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Parameter naming the satisfaction threshold.
pub const SATISFACTION: &str = "satisfaction";

const DEFAULT_SATISFACTION: f64 = 0.3;

/// The Schelling segregation model.
#[derive(Debug, Clone)]
pub struct SegregationSimulation {
    satisfaction: f64,
    grid: Grid<SegregationState>,
    palette: Palette<SegregationState>,
    clock: StepClock,
    rng: StdRng,
}

impl SegregationSimulation {
    /// Build from a configuration whose model is `segregation`.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        if config.simulation.model != ModelKind::Segregation {
            return Err(ConfigError::invalid(format!(
                "model {} is not segregation",
                config.simulation.model
            ))
            .into());
        }
        let satisfaction = config.parameter_or(SATISFACTION, DEFAULT_SATISFACTION);
        if satisfaction > 1.0 {
            return Err(ConfigError::invalid("satisfaction must lie in [0, 1]").into());
        }
        let mut rng = seeded_rng(config.simulation.seed);
        let grid: Grid<SegregationState> = build_initial_grid(config, &mut rng)?;
        let palette = Palette::with_overrides(&config.colors)?;
        info!(
            satisfaction,
            rows = grid.rows(),
            cols = grid.cols(),
            "Segregation simulation created"
        );
        Ok(Self {
            satisfaction,
            grid,
            palette,
            clock: StepClock::new(),
            rng,
        })
    }

    /// Whether the agent in `cell` is content with its neighborhood.
    pub fn is_satisfied(&self, cell: &Cell<SegregationState>) -> bool {
        let group = cell.current();
        if group == SegregationState::Empty {
            return true;
        }
        let (mut same, mut occupied) = (0_u32, 0_u32);
        for neighbor in self.grid.neighbors(cell.row(), cell.col()) {
            match neighbor.current() {
                SegregationState::Empty => {}
                other => {
                    occupied = occupied.saturating_add(1);
                    if other == group {
                        same = same.saturating_add(1);
                    }
                }
            }
        }
        occupied == 0 || f64::from(same) / f64::from(occupied) >= self.satisfaction
    }

    /// Number of agents currently unsatisfied.
    pub fn unsatisfied_count(&self) -> usize {
        self.grid
            .cells()
            .iter()
            .filter(|cell| !self.is_satisfied(cell))
            .count()
    }
}

impl Simulation for SegregationSimulation {
    type State = SegregationState;

    fn kind(&self) -> ModelKind {
        ModelKind::Segregation
    }

    fn step(&mut self) -> Result<StepReport, SimulationError> {
        let tick = self.clock.upcoming().ok_or(SimulationError::TickOverflow)?;

        let mut movers: Vec<Position> = self
            .grid
            .cells()
            .iter()
            .filter(|cell| !self.is_satisfied(cell))
            .map(Cell::position)
            .collect();
        let mut vacancies: Vec<Position> = self
            .grid
            .cells()
            .iter()
            .filter(|cell| cell.current() == SegregationState::Empty)
            .map(Cell::position)
            .collect();
        movers.shuffle(&mut self.rng);
        vacancies.shuffle(&mut self.rng);

        let mut moved = 0_usize;
        for (from, to) in movers.into_iter().zip(vacancies) {
            let group = self
                .grid
                .state_at(from)
                .ok_or_else(|| SimulationError::invariant(format!("mover at {from} vanished")))?;
            self.grid.stage(from, SegregationState::Empty)?;
            self.grid.stage(to, group)?;
            moved = moved.saturating_add(1);
        }
        self.grid.apply_next_states();
        self.clock.advance()?;

        debug!(tick, moved, "Segregation step complete");
        Ok(StepReport {
            tick,
            failed_cells: 0,
            grown: None,
        })
    }

    fn reinitialize(&mut self, config: &SimulationConfig) -> Result<(), SimulationError> {
        *self = Self::new(config)?;
        Ok(())
    }

    fn grid(&self) -> &Grid<SegregationState> {
        &self.grid
    }

    fn palette(&self) -> &Palette<SegregationState> {
        &self.palette
    }

    fn tick(&self) -> u64 {
        self.clock.tick()
    }
}
