//! Spreading fire through a forest.
//!
//! Burning cells burn out to empty ground. A tree next to a burning cell
//! catches with probability `fireProb`. Empty ground regrows a tree with
//! probability `growProb` (zero unless configured).

use cellsim_core::{
    ConfigError, Palette, Simulation, SimulationConfig, SimulationError, StepClock, StepReport,
    build_initial_grid, seeded_rng, step_grid,
};
use cellsim_grid::Grid;
use cellsim_types::{FireState, ModelKind};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Parameter naming the ignition probability.
pub const FIRE_PROB: &str = "fireProb";

/// Parameter naming the regrowth probability.
pub const GROW_PROB: &str = "growProb";

const DEFAULT_FIRE_PROB: f64 = 0.5;

/// The spreading-fire model.
#[derive(Debug, Clone)]
pub struct FireSimulation {
    fire_prob: f64,
    grow_prob: f64,
    grid: Grid<FireState>,
    palette: Palette<FireState>,
    clock: StepClock,
    rng: StdRng,
}

impl FireSimulation {
    /// Build from a configuration whose model is `spreading_fire`.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        if config.simulation.model != ModelKind::SpreadingFire {
            return Err(ConfigError::invalid(format!(
                "model {} is not spreading_fire",
                config.simulation.model
            ))
            .into());
        }
        let fire_prob = config.parameter_or(FIRE_PROB, DEFAULT_FIRE_PROB);
        let grow_prob = config.parameter_or(GROW_PROB, 0.0);
        let mut rng = seeded_rng(config.simulation.seed);
        let grid: Grid<FireState> = build_initial_grid(config, &mut rng)?;
        let palette = Palette::with_overrides(&config.colors)?;
        info!(
            fire_prob,
            grow_prob,
            rows = grid.rows(),
            cols = grid.cols(),
            "Fire simulation created"
        );
        Ok(Self {
            fire_prob,
            grow_prob,
            grid,
            palette,
            clock: StepClock::new(),
            rng,
        })
    }

    /// Probability that a tree next to a fire ignites.
    pub const fn fire_prob(&self) -> f64 {
        self.fire_prob
    }
}

impl Simulation for FireSimulation {
    type State = FireState;

    fn kind(&self) -> ModelKind {
        ModelKind::SpreadingFire
    }

    fn step(&mut self) -> Result<StepReport, SimulationError> {
        let tick = self.clock.upcoming().ok_or(SimulationError::TickOverflow)?;
        let grown = if self.grid.edge().requires_growth() {
            self.grid.grow_if_needed(self.grid.neighborhood().radius())?
        } else {
            None
        };

        let (fire_prob, grow_prob) = (self.fire_prob, self.grow_prob);
        let rng = &mut self.rng;
        let failed_cells = step_grid(&mut self.grid, tick, |grid, cell| {
            let next = match cell.current() {
                FireState::Burning => FireState::Empty,
                FireState::Tree => {
                    let exposed =
                        grid.count_neighbors(cell.row(), cell.col(), FireState::Burning) > 0;
                    if exposed && rng.random_bool(fire_prob) {
                        FireState::Burning
                    } else {
                        FireState::Tree
                    }
                }
                FireState::Empty => {
                    if grow_prob > 0.0 && rng.random_bool(grow_prob) {
                        FireState::Tree
                    } else {
                        FireState::Empty
                    }
                }
            };
            Ok(next)
        })?;

        self.clock.advance()?;
        debug!(
            tick,
            burning = self.grid.population().get(&FireState::Burning).copied().unwrap_or(0),
            "Fire step complete"
        );
        Ok(StepReport {
            tick,
            failed_cells,
            grown,
        })
    }

    fn reinitialize(&mut self, config: &SimulationConfig) -> Result<(), SimulationError> {
        *self = Self::new(config)?;
        Ok(())
    }

    fn grid(&self) -> &Grid<FireState> {
        &self.grid
    }

    fn palette(&self) -> &Palette<FireState> {
        &self.palette
    }

    fn tick(&self) -> u64 {
        self.clock.tick()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cellsim_core::CellSpec;

    use super::*;

    fn forest(fire_prob: f64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.simulation.model = ModelKind::SpreadingFire;
        config.grid.width = 5;
        config.grid.height = 1;
        let mut cells: Vec<CellSpec> = (1..5)
            .map(|col| CellSpec { row: 0, col, state: 1 })
            .collect();
        cells.push(CellSpec {
            row: 0,
            col: 0,
            state: 2,
        });
        config.initial.cells = Some(cells);
        config.parameters.insert(FIRE_PROB.to_owned(), fire_prob);
        config
    }

    #[test]
    fn certain_fire_sweeps_a_row() {
        let mut sim = FireSimulation::new(&forest(1.0)).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.state_map(), vec![vec![0, 2, 1, 1, 1]]);
        for _ in 0..4 {
            sim.step().unwrap();
        }
        assert_eq!(sim.state_map(), vec![vec![0, 0, 0, 0, 0]]);
    }

    #[test]
    fn zero_probability_never_spreads() {
        let mut sim = FireSimulation::new(&forest(0.0)).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.state_map(), vec![vec![0, 1, 1, 1, 1]]);
    }

    #[test]
    fn same_seed_replays() {
        let mut config = SimulationConfig::default();
        config.simulation.model = ModelKind::SpreadingFire;
        config.initial.random_by_proportion = Some(BTreeMap::from([(1, 0.6), (2, 0.02)]));
        config.parameters.insert(FIRE_PROB.to_owned(), 0.5);
        config.parameters.insert(GROW_PROB.to_owned(), 0.01);

        let mut first = FireSimulation::new(&config).unwrap();
        let mut second = FireSimulation::new(&config).unwrap();
        for _ in 0..10 {
            first.step().unwrap();
            second.step().unwrap();
            assert_eq!(first.state_map(), second.state_map());
        }
    }

    #[test]
    fn wrong_model_rejected() {
        let mut config = forest(0.5);
        config.simulation.model = ModelKind::GameOfLife;
        assert!(FireSimulation::new(&config).is_err());
    }
}
