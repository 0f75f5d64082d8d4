//! [`LoopSimulation`]: a seeded grid stepped by one transition table.

use cellsim_core::{
    Palette, Simulation, SimulationConfig, SimulationError, StepClock, StepReport, build_grid,
    plan_next_states,
};
use cellsim_grid::Grid;
use cellsim_types::{CellShape, CellState, LoopState, ModelKind};
use tracing::{debug, info};

use crate::error::LoopError;
use crate::rule::{LoopVariant, Neighbors, next_state};
use crate::seed;

/// A self-replicating signal loop.
#[derive(Debug, Clone)]
pub struct LoopSimulation {
    variant: LoopVariant,
    grid: Grid<LoopState>,
    palette: Palette<LoopState>,
    clock: StepClock,
}

impl LoopSimulation {
    /// Build from a configuration whose model is `langton_loop` or
    /// `tempesti_loop`.
    ///
    /// The seed goes at the center of the grid; entries of `initial.cells`
    /// are then written over it, which is how a run starts from a damaged
    /// or extended structure.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let variant = match config.simulation.model {
            ModelKind::LangtonLoop => LoopVariant::Langton,
            ModelKind::TempestiLoop => LoopVariant::Tempesti,
            other => return Err(LoopError::NotALoopModel(other).into()),
        };
        if config.grid.shape != CellShape::Square {
            return Err(LoopError::UnsupportedShape(config.grid.shape).into());
        }
        if let Some(name) = config
            .initial
            .initializer_names()
            .into_iter()
            .find(|name| *name != "cells")
        {
            return Err(LoopError::UnsupportedInitializer(name).into());
        }
        config.validate::<LoopState>()?;

        let mut grid: Grid<LoopState> = build_grid(config)?;
        let origin = seed::place(&mut grid, variant)?;
        for spec in config.initial.cells.iter().flatten() {
            let state = LoopState::from_code(spec.state).unwrap_or_default();
            grid.set_state(spec.position(), state)?;
        }
        let palette = Palette::with_overrides(&config.colors)?;
        info!(
            ?variant,
            rows = grid.rows(),
            cols = grid.cols(),
            origin = %origin,
            "Loop simulation created"
        );
        Ok(Self {
            variant,
            grid,
            palette,
            clock: StepClock::new(),
        })
    }

    /// Which transition table this loop runs.
    pub const fn variant(&self) -> LoopVariant {
        self.variant
    }

    /// Stage every cell's next state without committing.
    ///
    /// Staging reads current states only, so planning twice stages the same
    /// states.
    pub fn plan(&mut self) -> Result<usize, SimulationError> {
        let tick = self.clock.upcoming().ok_or(SimulationError::TickOverflow)?;
        let rules = self.variant.rules();
        plan_next_states(&mut self.grid, tick, |grid, cell| {
            let neighbors = Neighbors::read(grid, cell.position());
            Ok(next_state(rules, cell.current(), &neighbors))
        })
    }
}

impl Simulation for LoopSimulation {
    type State = LoopState;

    fn kind(&self) -> ModelKind {
        match self.variant {
            LoopVariant::Langton => ModelKind::LangtonLoop,
            LoopVariant::Tempesti => ModelKind::TempestiLoop,
        }
    }

    fn step(&mut self) -> Result<StepReport, SimulationError> {
        let tick = self.clock.upcoming().ok_or(SimulationError::TickOverflow)?;
        let grown = if self.grid.edge().requires_growth() {
            self.grid.grow_if_needed(1)?
        } else {
            None
        };

        let failed_cells = self.plan()?;
        self.grid.apply_next_states();
        self.clock.advance()?;

        debug!(
            tick,
            signals = self.grid.population().get(&LoopState::Head).copied().unwrap_or(0),
            "Loop step complete"
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

    fn grid(&self) -> &Grid<LoopState> {
        &self.grid
    }

    fn palette(&self) -> &Palette<LoopState> {
        &self.palette
    }

    fn tick(&self) -> u64 {
        self.clock.tick()
    }
}

#[cfg(test)]
mod tests {
    use cellsim_types::Position;

    use super::*;

    fn config(model: ModelKind, rows: usize, cols: usize) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.simulation.model = model;
        config.grid.height = rows;
        config.grid.width = cols;
        config
    }

    #[test]
    fn kind_follows_model() {
        let sim = LoopSimulation::new(&config(ModelKind::TempestiLoop, 7, 7)).unwrap();
        assert_eq!(sim.kind(), ModelKind::TempestiLoop);
        assert_eq!(sim.variant(), LoopVariant::Tempesti);
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn non_loop_model_rejected() {
        assert!(LoopSimulation::new(&config(ModelKind::GameOfLife, 7, 7)).is_err());
    }

    #[test]
    fn hexagonal_cells_rejected() {
        let mut config = config(ModelKind::LangtonLoop, 7, 7);
        config.grid.shape = CellShape::Hexagon;
        assert!(LoopSimulation::new(&config).is_err());
    }

    #[test]
    fn random_initializer_rejected() {
        let mut config = config(ModelKind::LangtonLoop, 7, 7);
        config.initial.states = Some(vec![0; 49]);
        assert!(LoopSimulation::new(&config).is_err());
    }

    #[test]
    fn signal_moves_clockwise() {
        let mut sim = LoopSimulation::new(&config(ModelKind::TempestiLoop, 5, 5)).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.grid().state_at(Position::new(1, 3)), Some(LoopState::Head));
        assert_eq!(sim.grid().state_at(Position::new(1, 2)), Some(LoopState::Tail));
        assert_eq!(sim.grid().state_at(Position::new(1, 1)), Some(LoopState::Core));
    }
}
