//! Model registry and batch runner for cellsim.
//!
//! A configuration's `simulation.model` tag selects one of the shipped rule
//! engines. [`AnySimulation`] wraps whichever was built so callers can step
//! and query it uniformly, and [`run`] drives one for a fixed number of
//! steps and summarizes the outcome.
//!
//! # Modules
//!
//! - [`error`] -- [`EngineError`], the runner's top-level error.
//! - [`registry`] -- [`AnySimulation`], the closed model registry.
//! - [`run`] -- [`run`] and its [`RunSummary`].

pub mod error;
pub mod registry;
pub mod run;

pub use error::EngineError;
pub use registry::AnySimulation;
pub use run::{RunSummary, run};
