//! Shared type definitions for the cellsim cellular-automaton engine.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for display collaborators.
//!
//! # Modules
//!
//! - [`ids`] -- Sequential identifier wrappers for agents, loans, and diseases
//! - [`enums`] -- Model kinds, topology selectors, and economy enumerations
//! - [`position`] -- Grid coordinates
//! - [`states`] -- Per-model cell state alphabets and the [`CellState`] trait

pub mod enums;
pub mod ids;
pub mod position;
pub mod states;

// Re-export all public types at crate root for convenience.
pub use enums::{CellShape, EdgePolicy, ModelKind, NeighborArrangement, Resource, Sex};
pub use ids::{AgentId, DiseaseId, LoanId};
pub use position::Position;
pub use states::{
    CellState, FireState, LifeState, LoopState, SegregationState, SugarscapeState,
};
