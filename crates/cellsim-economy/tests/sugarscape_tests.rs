//! Scenario tests for the Sugarscape step loop: lending and repayment,
//! reproduction, seed replay, and disease.
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use cellsim_core::{Simulation, SimulationConfig};
use cellsim_economy::{AgentSeed, FieldCell, ResourceField, SugarscapeSimulation, params};
use cellsim_types::{AgentId, EdgePolicy, ModelKind, Position, Resource, Sex, SugarscapeState};
use rust_decimal_macros::dec;

/// A one-row bounded strip with no resources on the field and spice off.
fn barren_strip(parameters: &[(&str, f64)]) -> (SimulationConfig, ResourceField) {
    let mut config = SimulationConfig::default();
    config.simulation.model = ModelKind::Sugarscape;
    config.grid.width = 3;
    config.grid.height = 1;
    config.grid.edge = EdgePolicy::Bounded;
    config.parameters.insert(params::SPICE.to_owned(), 0.0);
    for (name, value) in parameters {
        config.parameters.insert((*name).to_owned(), *value);
    }
    let field = ResourceField::from_cells(1, 3, vec![FieldCell::default(); 3]).unwrap();
    (config, field)
}

fn seed(col: usize, sex: Sex, sugar: i64, metabolism: u32) -> AgentSeed {
    AgentSeed {
        position: Some(Position::new(0, col)),
        sugar,
        spice: 0,
        vision: 1,
        sugar_metabolism: metabolism,
        spice_metabolism: 0,
        sex,
        fertile_ages: (1, 50),
        immune: Vec::new(),
        diseases: Vec::new(),
    }
}

fn sugar_of(sim: &SugarscapeSimulation, id: u64) -> Option<u32> {
    sim.agents().get(AgentId(id)).map(|agent| agent.sugar)
}

#[test]
fn loan_issue_partial_repayment_and_reissue() {
    let (config, field) = barren_strip(&[
        (params::LOAN_RESERVE, 50.0),
        (params::LOAN_NEED_THRESHOLD, 10.0),
        (params::LOAN_RATE, 0.1),
        (params::LOAN_DURATION, 2.0),
    ]);
    let seeds = vec![seed(0, Sex::Female, 100, 1), seed(1, Sex::Female, 3, 1)];
    let mut sim = SugarscapeSimulation::with_population(&config, field, seeds).unwrap();

    // Tick 1: metabolism leaves 99 and 2; the lender advances 8.
    sim.step().unwrap();
    assert_eq!(sugar_of(&sim, 0), Some(91));
    assert_eq!(sugar_of(&sim, 1), Some(10));
    assert_eq!(sim.loans().len(), 1);
    assert_eq!(sim.last_step().loans_issued, 1);

    // Tick 2: the pair is already linked by a loan.
    sim.step().unwrap();
    assert_eq!(sim.last_step().loans_issued, 0);

    // Tick 3: 8 * 1.1 rounds to 9 owed; the borrower holds 8 and pays 4.
    sim.step().unwrap();
    assert_eq!(sugar_of(&sim, 0), Some(93));
    assert_eq!(sugar_of(&sim, 1), Some(4));
    let renewed = sim.loans().iter().next().unwrap();
    assert_eq!(renewed.principal, dec!(5));
    assert_eq!(renewed.due_at, 5);

    // Tick 5: 5 * 1.1 rounds to 6 owed; the borrower holds 2 and pays 1.
    sim.step().unwrap();
    sim.step().unwrap();
    assert_eq!(sugar_of(&sim, 1), Some(1));
    assert_eq!(sim.loans().len(), 1);

    // Tick 6: the borrower starves and its loan is dropped.
    sim.step().unwrap();
    assert_eq!(sugar_of(&sim, 1), None);
    assert!(sim.loans().is_empty());
    assert_eq!(sim.population().get(&SugarscapeState::Agent), Some(&1));
}

#[test]
fn loan_repaid_in_full_at_maturity() {
    let (config, field) = barren_strip(&[
        (params::LOAN_RESERVE, 50.0),
        (params::LOAN_NEED_THRESHOLD, 10.0),
        (params::LOAN_RATE, 0.1),
        (params::LOAN_DURATION, 2.0),
    ]);
    let seeds = vec![seed(0, Sex::Female, 100, 0), seed(1, Sex::Female, 3, 0)];
    let mut sim = SugarscapeSimulation::with_population(&config, field, seeds).unwrap();

    // Tick 1: the borrower is topped up to the need threshold.
    sim.step().unwrap();
    assert_eq!(sugar_of(&sim, 0), Some(93));
    assert_eq!(sugar_of(&sim, 1), Some(10));
    assert_eq!(sim.loans().len(), 1);

    sim.step().unwrap();
    assert_eq!(sim.last_step().settlements, 0);

    // Tick 3: 7 * 1.1 rounds to 8 owed and the borrower can cover it.
    sim.step().unwrap();
    assert_eq!(sim.last_step().settlements, 1);
    assert_eq!(sugar_of(&sim, 0), Some(101));
    assert_eq!(sugar_of(&sim, 1), Some(2));
    assert!(sim.loans().is_empty());
}

#[test]
fn neighbors_reproduce_into_an_empty_cell() {
    let (config, field) = barren_strip(&[(params::FERTILE_AGE_MIN, 1.0)]);
    let seeds = vec![seed(0, Sex::Female, 20, 0), seed(1, Sex::Male, 20, 0)];
    let mut sim = SugarscapeSimulation::with_population(&config, field, seeds).unwrap();

    sim.step().unwrap();
    assert_eq!(sim.last_step().births, 1);
    assert_eq!(sim.agents().len(), 3);
    assert_eq!(sugar_of(&sim, 0), Some(10));
    assert_eq!(sugar_of(&sim, 1), Some(10));

    let child = sim.agents().get(AgentId(2)).unwrap();
    assert_eq!(child.position, Position::new(0, 2));
    assert_eq!(child.sugar, 20);
    assert_eq!(child.age, 0);
    assert_eq!(sim.state_map(), vec![vec![1, 1, 1]]);
    assert_eq!(sim.total(Resource::Sugar), 40);
}

#[test]
fn same_seed_replays() {
    let mut config = SimulationConfig::default();
    config.simulation.model = ModelKind::Sugarscape;
    config.grid.width = 25;
    config.grid.height = 25;
    config.initial.random_by_count = Some(BTreeMap::from([(1, 60)]));
    config.parameters.insert(params::DISEASE_COUNT.to_owned(), 3.0);
    config.parameters.insert(params::INFECTION_PROB.to_owned(), 0.3);

    let mut first = SugarscapeSimulation::new(&config).unwrap();
    let mut second = SugarscapeSimulation::new(&config).unwrap();
    for _ in 0..20 {
        first.step().unwrap();
        second.step().unwrap();
        assert_eq!(first.state_map(), second.state_map());
        assert_eq!(first.last_step(), second.last_step());
    }
}

#[test]
fn total_sugar_bounded_by_capacity_plus_growback() {
    let mut config = SimulationConfig::default();
    config.simulation.model = ModelKind::Sugarscape;
    config.grid.width = 30;
    config.grid.height = 30;
    config.initial.random_by_count = Some(BTreeMap::from([(1, 80)]));

    let mut sim = SugarscapeSimulation::new(&config).unwrap();
    let capacity = sim.field().capacity(Resource::Sugar);
    let endowments = sim.agents().total(Resource::Sugar);
    for _ in 0..30 {
        sim.step().unwrap();
        let grown = sim.ledger().total_sources(Resource::Sugar);
        let ceiling = rust_decimal::Decimal::from(capacity + endowments) + grown;
        assert!(rust_decimal::Decimal::from(sim.total(Resource::Sugar)) <= ceiling);
        assert!(sim.field().total(Resource::Sugar) <= capacity);
    }
}

#[test]
fn immune_systems_clear_disease() {
    let (config, field) = barren_strip(&[(params::DISEASE_METABOLISM, 0.0)]);
    let mut sick = seed(0, Sex::Female, 50, 0);
    sick.immune = vec![false; 6];
    sick.diseases = vec![cellsim_economy::Disease {
        id: cellsim_types::DiseaseId(0),
        genome: vec![true, true, true],
    }];
    let mut sim = SugarscapeSimulation::with_population(&config, field, vec![sick]).unwrap();
    for _ in 0..3 {
        sim.step().unwrap();
    }
    let agent = sim.agents().get(AgentId(0)).unwrap();
    assert!(agent.diseases.is_empty());
    assert_eq!(agent.immune, vec![true, true, true, false, false, false]);
}
