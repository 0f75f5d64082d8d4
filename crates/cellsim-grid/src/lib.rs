//! Grid arena, cells, and topology for the cellsim engine.
//!
//! This crate models the space every automaton runs on: a row-major arena of
//! double-buffered cells, plus stateless strategies that decide how
//! coordinates past the boundary are handled and which offsets count as
//! neighbors.
//!
//! # Modules
//!
//! - [`cell`] -- [`Cell`] with a current state and a staged next state.
//! - [`edge`] -- [`EdgeStrategy`]: bounded, toroidal, mirror, and infinite
//!   boundary handling.
//! - [`error`] -- Error types for grid operations.
//! - [`grid`] -- [`Grid`]: the arena, neighbor queries, the commit step, and
//!   on-demand growth.
//! - [`neighborhood`] -- [`NeighborhoodStrategy`]: Moore, Von Neumann,
//!   hexagonal, triangular, and composite offset sets.

pub mod cell;
pub mod edge;
pub mod error;
pub mod grid;
pub mod neighborhood;

// Re-export primary types at crate root.
pub use cell::Cell;
pub use edge::EdgeStrategy;
pub use error::GridError;
pub use grid::{DEFAULT_MAX_CELLS, Grid, GrowthOffset};
pub use neighborhood::{NeighborhoodStrategy, Offset, ParityLock};
