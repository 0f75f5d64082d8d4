//! Game of Life and other birth/survival automata.

use cellsim_core::{
    ConfigError, Palette, Simulation, SimulationConfig, SimulationError, StepClock, StepReport,
    build_initial_grid, seeded_rng, step_grid,
};
use cellsim_grid::Grid;
use cellsim_types::{LifeState, ModelKind};
use tracing::{debug, info};

use crate::rule_string::LifeRule;

/// A life-like automaton driven by a [`LifeRule`].
///
/// With an infinite edge the grid grows before each planning pass so live
/// cells never sit within one neighborhood radius of the boundary.
#[derive(Debug, Clone)]
pub struct LifeSimulation {
    kind: ModelKind,
    rule: LifeRule,
    grid: Grid<LifeState>,
    palette: Palette<LifeState>,
    clock: StepClock,
}

impl LifeSimulation {
    /// Build from a configuration whose model is `game_of_life` or
    /// `life_like`.
    ///
    /// Game of Life always runs `B3/S23`; life-like models parse `rule`.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let (kind, rule) = match (Self::rule_for(config), config.validate::<LifeState>()) {
            (Ok(found), Ok(())) => found,
            (Ok(_), Err(err)) | (Err(err), Ok(())) => return Err(err.into()),
            (Err(rule_err), Err(config_err)) => return Err(rule_err.combine(config_err).into()),
        };
        let mut rng = seeded_rng(config.simulation.seed);
        let grid: Grid<LifeState> = build_initial_grid(config, &mut rng)?;
        let palette = Palette::with_overrides(&config.colors)?;
        info!(
            model = %kind,
            rule = %rule,
            rows = grid.rows(),
            cols = grid.cols(),
            "Life simulation created"
        );
        Ok(Self {
            kind,
            rule,
            grid,
            palette,
            clock: StepClock::new(),
        })
    }

    /// The active birth/survival rule.
    pub const fn rule(&self) -> &LifeRule {
        &self.rule
    }

    fn rule_for(config: &SimulationConfig) -> Result<(ModelKind, LifeRule), ConfigError> {
        match config.simulation.model {
            ModelKind::GameOfLife => Ok((ModelKind::GameOfLife, LifeRule::conway())),
            ModelKind::LifeLike => {
                let rule = LifeRule::parse(config.rule.as_deref().unwrap_or_default())?;
                Ok((ModelKind::LifeLike, rule))
            }
            other => Err(ConfigError::invalid(format!(
                "model {other} is not a life-like automaton"
            ))),
        }
    }
}

impl Simulation for LifeSimulation {
    type State = LifeState;

    fn kind(&self) -> ModelKind {
        self.kind
    }

    fn step(&mut self) -> Result<StepReport, SimulationError> {
        let tick = self.clock.upcoming().ok_or(SimulationError::TickOverflow)?;
        let grown = if self.grid.edge().requires_growth() {
            self.grid.grow_if_needed(self.grid.neighborhood().radius())?
        } else {
            None
        };

        let rule = self.rule;
        let failed_cells = step_grid(&mut self.grid, tick, |grid, cell| {
            let alive = grid.count_neighbors(cell.row(), cell.col(), LifeState::Alive);
            let next = match cell.current() {
                LifeState::Alive if rule.survives(alive) => LifeState::Alive,
                LifeState::Empty if rule.births(alive) => LifeState::Alive,
                LifeState::Alive | LifeState::Empty => LifeState::Empty,
            };
            Ok(next)
        })?;

        self.clock.advance()?;
        debug!(
            tick,
            alive = self.grid.population().get(&LifeState::Alive).copied().unwrap_or(0),
            "Life step complete"
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

    fn grid(&self) -> &Grid<LifeState> {
        &self.grid
    }

    fn palette(&self) -> &Palette<LifeState> {
        &self.palette
    }

    fn tick(&self) -> u64 {
        self.clock.tick()
    }
}

#[cfg(test)]
mod tests {
    use cellsim_core::CellSpec;

    use super::*;

    fn life_config(width: usize, height: usize, cells: &[(usize, usize)]) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.grid.width = width;
        config.grid.height = height;
        config.initial.cells = Some(
            cells
                .iter()
                .map(|&(row, col)| CellSpec { row, col, state: 1 })
                .collect(),
        );
        config
    }

    #[test]
    fn block_is_a_still_life() {
        let config = life_config(4, 4, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
        let mut sim = LifeSimulation::new(&config).unwrap();
        let before = sim.state_map();
        for _ in 0..3 {
            assert!(sim.step().is_ok());
        }
        assert_eq!(sim.state_map(), before);
        assert_eq!(sim.tick(), 3);
    }

    #[test]
    fn blinker_has_period_two() {
        let config = life_config(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let mut sim = LifeSimulation::new(&config).unwrap();
        let start = sim.state_map();
        assert!(sim.step().is_ok());
        let flipped = sim.state_map();
        assert_ne!(flipped, start);
        assert_eq!(
            flipped.iter().map(|row| row.get(2).copied()).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(1), Some(1), Some(0)]
        );
        assert!(sim.step().is_ok());
        assert_eq!(sim.state_map(), start);
    }

    #[test]
    fn bad_rule_string_fails_construction() {
        let mut config = life_config(5, 5, &[]);
        config.simulation.model = ModelKind::LifeLike;
        config.rule = Some("B9/S23".to_owned());
        assert!(matches!(
            LifeSimulation::new(&config),
            Err(SimulationError::Config {
                source: ConfigError::RuleString { .. }
            })
        ));
    }

    #[test]
    fn bad_rule_string_reported_with_other_problems() {
        let mut config = life_config(5, 5, &[]);
        config.simulation.model = ModelKind::LifeLike;
        config.rule = Some("B9/S23".to_owned());
        config.grid.width = 0;
        match LifeSimulation::new(&config) {
            Err(SimulationError::Config {
                source: ConfigError::Invalid { problems },
            }) => {
                assert!(problems.len() >= 2, "{problems:?}");
                assert!(problems.iter().any(|p| p.contains("B9/S23")), "{problems:?}");
            }
            other => panic!("expected combined config error, got {other:?}"),
        }
    }

    #[test]
    fn game_of_life_ignores_rule_string() {
        let mut config = life_config(5, 5, &[]);
        config.rule = Some("B36/S23".to_owned());
        let sim = LifeSimulation::new(&config);
        assert!(sim.is_ok_and(|s| *s.rule() == LifeRule::conway()));
    }

    #[test]
    fn reinitialize_resets_tick() {
        let config = life_config(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let mut sim = LifeSimulation::new(&config).unwrap();
        assert!(sim.step().is_ok());
        assert!(sim.reinitialize(&config).is_ok());
        assert_eq!(sim.tick(), 0);
    }
}
