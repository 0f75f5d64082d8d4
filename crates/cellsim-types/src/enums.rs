//! Enumeration types shared across the workspace.
//!
//! Topology selectors ([`EdgePolicy`], [`CellShape`], [`NeighborArrangement`])
//! are plain data: the grid crate maps them onto concrete strategies. The
//! [`ModelKind`] tag is what a configuration file names to pick a rule engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// The closed set of rule engines the workspace ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ModelKind {
    /// Conway's Game of Life with the fixed `B3/S23` rule.
    GameOfLife,
    /// Life-like automaton driven by a `B/S` rule string.
    LifeLike,
    /// Forest fire with probabilistic ignition.
    SpreadingFire,
    /// Schelling segregation with a satisfaction threshold.
    Segregation,
    /// Agent-based sugar/spice economy with trade, lending, and disease.
    Sugarscape,
    /// Langton-style signal loop with a growing construction arm.
    LangtonLoop,
    /// Tempesti-style signal loop with a self-repairing sheath.
    TempestiLoop,
}

impl core::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::GameOfLife => "game_of_life",
            Self::LifeLike => "life_like",
            Self::SpreadingFire => "spreading_fire",
            Self::Segregation => "segregation",
            Self::Sugarscape => "sugarscape",
            Self::LangtonLoop => "langton_loop",
            Self::TempestiLoop => "tempesti_loop",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

/// How coordinates outside the grid are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EdgePolicy {
    /// Out-of-range coordinates are rejected.
    #[default]
    Bounded,
    /// Coordinates wrap modulo the grid dimensions.
    Toroidal,
    /// Coordinates reflect about the boundary (`-1` maps to `0`).
    Mirror,
    /// The grid grows on demand; requires a growable grid.
    Infinite,
}

/// The geometric shape of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CellShape {
    /// Square cells on a rectangular lattice.
    #[default]
    Square,
    /// Pointy-top hexagons in odd-row offset layout.
    Hexagon,
    /// Alternating up/down triangles; `(row + col)` even points up.
    Triangle,
}

/// Which touching cells count as neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NeighborArrangement {
    /// Every cell sharing an edge or a corner.
    #[default]
    Complete,
    /// Only cells sharing an edge.
    Cardinal,
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Biological sex of an agent; reproduction pairs opposite sexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Sex {
    /// Female agent.
    Female,
    /// Male agent.
    Male,
}

impl Sex {
    /// Return the opposite sex.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Female => Self::Male,
            Self::Male => Self::Female,
        }
    }
}

/// A resource tracked by the agent economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Resource {
    /// The primary resource; every agent metabolizes it.
    Sugar,
    /// The secondary resource; tracked only when spice is enabled.
    Spice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_kind_serde_names_match_display() {
        for kind in [
            ModelKind::GameOfLife,
            ModelKind::LifeLike,
            ModelKind::SpreadingFire,
            ModelKind::Segregation,
            ModelKind::Sugarscape,
            ModelKind::LangtonLoop,
            ModelKind::TempestiLoop,
        ] {
            let json = serde_json::to_string(&kind).ok();
            assert_eq!(json, Some(format!("\"{kind}\"")));
        }
    }

    #[test]
    fn topology_defaults() {
        assert_eq!(EdgePolicy::default(), EdgePolicy::Bounded);
        assert_eq!(CellShape::default(), CellShape::Square);
        assert_eq!(NeighborArrangement::default(), NeighborArrangement::Complete);
    }

    #[test]
    fn opposite_sex_is_an_involution() {
        assert_eq!(Sex::Female.opposite(), Sex::Male);
        assert_eq!(Sex::Male.opposite().opposite(), Sex::Male);
    }
}
