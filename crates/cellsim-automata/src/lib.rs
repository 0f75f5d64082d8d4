//! Neighbor-counting automata for the cellsim engine.
//!
//! Each model's next state depends only on a cell's current state and what
//! its neighbors currently hold.
//!
//! # Modules
//!
//! - [`fire`] -- [`FireSimulation`]: probabilistic forest fire.
//! - [`life`] -- [`LifeSimulation`]: Game of Life and rule-string variants,
//!   including unbounded growth.
//! - [`rule_string`] -- [`LifeRule`] parsing for `B/S` notation.
//! - [`segregation`] -- [`SegregationSimulation`]: Schelling relocation.

pub mod fire;
pub mod life;
pub mod rule_string;
pub mod segregation;

pub use fire::FireSimulation;
pub use life::LifeSimulation;
pub use rule_string::{LifeRule, presets};
pub use segregation::SegregationSimulation;
