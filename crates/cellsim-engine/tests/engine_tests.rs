//! End-to-end runs from YAML documents through the model registry.

#![allow(clippy::unwrap_used)]

use cellsim_core::{ConfigError, SimulationConfig, SimulationError};
use cellsim_engine::{AnySimulation, run};
use cellsim_types::ModelKind;

const FIRE: &str = r"
simulation: { model: spreading_fire, seed: 11 }
grid: { width: 16, height: 12, edge: toroidal }
initial:
  random_by_proportion: { 1: 0.6, 2: 0.02 }
parameters: { fireProb: 0.7, growProb: 0.01 }
";

const ECONOMY: &str = r"
simulation: { model: sugarscape, seed: 3 }
grid: { width: 20, height: 20 }
parameters:
  initialAgents: 40
  diseaseCount: 2
  infectionProb: 0.2
";

fn parse(yaml: &str) -> SimulationConfig {
    SimulationConfig::parse(yaml).unwrap()
}

#[test]
fn same_config_replays_through_the_registry() {
    for yaml in [FIRE, ECONOMY] {
        let config = parse(yaml);
        let mut first = AnySimulation::from_config(&config).unwrap();
        let mut second = AnySimulation::from_config(&config).unwrap();
        for _ in 0..8 {
            first.step().unwrap();
            second.step().unwrap();
            assert_eq!(first.state_map(), second.state_map());
            assert_eq!(first.economy_stats(), second.economy_stats());
        }
    }
}

#[test]
fn color_map_uses_configured_overrides() {
    let yaml = r##"
simulation: { model: life_like }
grid: { width: 3, height: 3 }
rule: "B36/S23"
initial:
  cells: [{ row: 1, col: 1, state: 1 }]
colors: { 1: "#00ff00" }
"##;
    let sim = AnySimulation::from_config(&parse(yaml)).unwrap();
    assert_eq!(sim.kind(), ModelKind::LifeLike);
    let colors = sim.color_map();
    assert_eq!(colors.get(1).and_then(|row| row.get(1)).map(String::as_str), Some("#00ff00"));
    assert_eq!(colors.first().and_then(|row| row.first()).map(String::as_str), Some("white"));
}

#[test]
fn malformed_rule_string_is_a_config_error() {
    let yaml = r#"
simulation: { model: life_like }
rule: "B9/S23"
"#;
    let result = AnySimulation::from_config(&parse(yaml));
    assert!(matches!(result, Err(SimulationError::Config { .. })));
}

#[test]
fn every_problem_reported_together() {
    let yaml = r"
simulation: { model: segregation }
grid: { width: 4, height: 4 }
initial:
  cells:
    - { row: 9, col: 0, state: 1 }
    - { row: 0, col: 0, state: 7 }
parameters: { satisfaction: -1 }
";
    match AnySimulation::from_config(&parse(yaml)) {
        Err(SimulationError::Config {
            source: ConfigError::Invalid { problems },
        }) => assert!(problems.len() >= 3, "{problems:?}"),
        other => panic!("expected aggregated config error, got {other:?}"),
    }
}

#[test]
fn economy_run_summarizes_activity() {
    let summary = run(&parse(ECONOMY), 10).unwrap();
    assert_eq!(summary.model, ModelKind::Sugarscape);
    assert_eq!(summary.ticks, 10);
    assert!(summary.economy.is_some());
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json.get("model").and_then(|v| v.as_str()), Some("sugarscape"));
    assert!(
        json.get("economy")
            .and_then(|economy| economy.get("moved"))
            .is_some_and(serde_json::Value::is_u64)
    );
}

#[test]
fn infinite_life_grows_and_reports_it() {
    let yaml = r"
simulation: { model: game_of_life }
grid: { width: 5, height: 5, edge: infinite, max_cells: 4096 }
initial:
  cells:
    - { row: 0, col: 1, state: 1 }
    - { row: 1, col: 2, state: 1 }
    - { row: 2, col: 0, state: 1 }
    - { row: 2, col: 1, state: 1 }
    - { row: 2, col: 2, state: 1 }
";
    let summary = run(&parse(yaml), 12).unwrap();
    assert!(summary.growth_steps > 0);
    assert!(summary.rows > 5 || summary.cols > 5);
    assert_eq!(summary.population.get("alive"), Some(&5));
}
