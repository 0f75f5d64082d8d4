//! Configuration, step protocol, and the simulation contract for cellsim.
//!
//! Every rule engine builds on this crate: it loads and validates a run's
//! configuration, lays out the initial grid, and drives the two-phase
//! plan/commit step that keeps transitions order-independent.
//!
//! # Modules
//!
//! - [`clock`] -- Step counter with checked advance.
//! - [`config`] -- YAML configuration loading and aggregated validation.
//! - [`error`] -- [`SimulationError`] and the recoverable [`CellRuleError`].
//! - [`init`] -- Grid construction and initial layout resolution.
//! - [`palette`] -- State to color token mapping.
//! - [`simulation`] -- The [`Simulation`] trait and the seeded generator.
//! - [`step`] -- Planning and commit helpers.

pub mod clock;
pub mod config;
pub mod error;
pub mod init;
pub mod palette;
pub mod simulation;
pub mod step;

pub use clock::StepClock;
pub use config::{
    CellSpec, ConfigError, GridConfig, InitialConfig, LogFormat, LoggingConfig, RunConfig,
    SimulationConfig, SimulationSection,
};
pub use error::{CellRuleError, SimulationError};
pub use init::{apply_states, build_grid, build_initial_grid, initial_states};
pub use palette::Palette;
pub use simulation::{Simulation, StepReport, seeded_rng};
pub use step::{plan_next_states, step_grid};
