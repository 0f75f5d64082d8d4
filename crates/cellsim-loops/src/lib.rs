//! Self-replicating signal loops for the cellsim engine.
//!
//! A loop is a ring of conductor wrapped in sheath, with a signal (a head
//! followed by a tail) running around it. Every cell's next state comes
//! from a static transition table over its four cardinal neighbors.
//!
//! # Modules
//!
//! - [`error`] -- [`LoopError`] for layouts that cannot host the seed.
//! - [`rule`] -- [`TransitionRule`] tables for both variants.
//! - [`seed`] -- The centered starting structure.
//! - [`simulation`] -- [`LoopSimulation`], the [`Simulation`] implementation.
//!
//! [`Simulation`]: cellsim_core::Simulation

pub mod error;
pub mod rule;
pub mod seed;
pub mod simulation;

pub use error::LoopError;
pub use rule::{LoopVariant, Neighbors, TransitionRule, next_state};
pub use seed::{RING_LENGTH, SEED_SIZE};
pub use simulation::LoopSimulation;
