//! Batch runs and their summaries.

use std::collections::BTreeMap;

use cellsim_core::{SimulationConfig, SimulationError};
use cellsim_economy::EconomyStats;
use cellsim_types::ModelKind;
use serde::Serialize;
use tracing::{debug, info};

use crate::registry::AnySimulation;

/// What a finished run looked like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Model that ran.
    pub model: ModelKind,
    /// Title from the configuration.
    pub title: String,
    /// Generator seed.
    pub seed: u64,
    /// Steps completed.
    pub ticks: u64,
    /// Final grid rows.
    pub rows: usize,
    /// Final grid columns.
    pub cols: usize,
    /// Cells per state name at the end of the run.
    pub population: BTreeMap<String, usize>,
    /// Cell rule failures recovered over the whole run.
    pub failed_cells: usize,
    /// Steps on which the grid grew.
    pub growth_steps: usize,
    /// Counters of the last economy step, for economy models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economy: Option<EconomyStats>,
}

/// Build the configured model and run it for `steps` steps.
pub fn run(config: &SimulationConfig, steps: u64) -> Result<RunSummary, SimulationError> {
    let mut simulation = AnySimulation::from_config(config)?;
    let (mut failed_cells, mut growth_steps) = (0_usize, 0_usize);

    for _ in 0..steps {
        let report = simulation.step()?;
        failed_cells = failed_cells.saturating_add(report.failed_cells);
        if let Some(offset) = report.grown {
            growth_steps = growth_steps.saturating_add(1);
            debug!(tick = report.tick, ?offset, "Grid grew");
        }
    }

    let (rows, cols) = simulation.dimensions();
    let summary = RunSummary {
        model: simulation.kind(),
        title: config.simulation.title.clone(),
        seed: config.simulation.seed,
        ticks: simulation.tick(),
        rows,
        cols,
        population: simulation.population_by_name(),
        failed_cells,
        growth_steps,
        economy: simulation.economy_stats(),
    };
    info!(
        model = %summary.model,
        ticks = summary.ticks,
        failed_cells,
        growth_steps,
        "Run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blinker_run_summary() {
        let yaml = r"
simulation: { model: game_of_life, title: Blinker }
grid: { width: 5, height: 5 }
initial:
  cells:
    - { row: 2, col: 1, state: 1 }
    - { row: 2, col: 2, state: 1 }
    - { row: 2, col: 3, state: 1 }
";
        let config = SimulationConfig::parse(yaml).unwrap();
        let summary = run(&config, 3).unwrap();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.title, "Blinker");
        assert_eq!(summary.population.get("alive"), Some(&3));
        assert_eq!(summary.failed_cells, 0);
        assert!(summary.economy.is_none());
    }

    #[test]
    fn zero_steps_reports_initial_state() {
        let mut config = SimulationConfig::default();
        config.simulation.model = ModelKind::TempestiLoop;
        config.grid.width = 7;
        config.grid.height = 7;
        let summary = run(&config, 0).unwrap();
        assert_eq!(summary.ticks, 0);
        assert_eq!((summary.rows, summary.cols), (7, 7));
    }
}
