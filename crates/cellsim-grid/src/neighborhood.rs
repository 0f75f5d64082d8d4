//! Neighborhood strategies: which relative offsets count as neighbors.
//!
//! Offsets may depend on the cell's own coordinates. Hexagonal grids use an
//! odd-row offset layout, so the diagonal neighbors shift with row parity.
//! Triangular grids alternate orientation; a cell whose `row + col` is even
//! points up.

use std::collections::BTreeSet;

use cellsim_types::{CellShape, NeighborArrangement};
use serde::{Deserialize, Serialize};

/// A relative `(row, col)` offset.
pub type Offset = (isize, isize);

const MOORE: [Offset; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const VON_NEUMANN: [Offset; 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

const HEX_EVEN_ROW: [Offset; 6] = [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];
const HEX_ODD_ROW: [Offset; 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

const TRI_EDGE_UP: [Offset; 3] = [(0, -1), (0, 1), (1, 0)];
const TRI_EDGE_DOWN: [Offset; 3] = [(-1, 0), (0, -1), (0, 1)];

const TRI_FULL_UP: [Offset; 12] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -2),
    (0, -1),
    (0, 1),
    (0, 2),
    (1, -2),
    (1, -1),
    (1, 0),
    (1, 1),
    (1, 2),
];

const TRI_FULL_DOWN: [Offset; 12] = [
    (-1, -2),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (-1, 2),
    (0, -2),
    (0, -1),
    (0, 1),
    (0, 2),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Coordinate parities a strategy's offsets depend on.
///
/// A translation that flips a locked parity changes which cells count as
/// neighbors, so growth keeps the locked parities of every shift even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParityLock {
    /// Offsets change with the parity of the row.
    pub row: bool,
    /// Offsets change with the parity of `row + col`.
    pub diagonal: bool,
}

impl ParityLock {
    const fn union(self, other: Self) -> Self {
        Self {
            row: self.row || other.row,
            diagonal: self.diagonal || other.diagonal,
        }
    }
}

/// The set of offsets a grid consults for neighbor queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborhoodStrategy {
    /// The eight surrounding squares.
    #[default]
    Moore,
    /// The four orthogonally adjacent squares.
    VonNeumann,
    /// The six touching hexagons, odd rows shifted right.
    Hexagonal,
    /// The three triangles sharing an edge.
    TriangularEdge,
    /// The twelve triangles sharing an edge or a vertex.
    TriangularFull,
    /// Union of several strategies in order.
    Composite {
        /// Member strategies, consulted in order.
        parts: Vec<NeighborhoodStrategy>,
        /// Drop offsets already produced by an earlier member.
        dedup: bool,
    },
}

impl NeighborhoodStrategy {
    /// Map a cell shape and arrangement onto a strategy.
    pub const fn for_shape(shape: CellShape, arrangement: NeighborArrangement) -> Self {
        match (shape, arrangement) {
            (CellShape::Square, NeighborArrangement::Complete) => Self::Moore,
            (CellShape::Square, NeighborArrangement::Cardinal) => Self::VonNeumann,
            (CellShape::Hexagon, _) => Self::Hexagonal,
            (CellShape::Triangle, NeighborArrangement::Cardinal) => Self::TriangularEdge,
            (CellShape::Triangle, NeighborArrangement::Complete) => Self::TriangularFull,
        }
    }

    /// Relative offsets of the neighbors of `(row, col)`.
    pub fn offsets(&self, row: usize, col: usize) -> Vec<Offset> {
        match self {
            Self::Moore => MOORE.to_vec(),
            Self::VonNeumann => VON_NEUMANN.to_vec(),
            Self::Hexagonal => {
                if row & 1 == 1 {
                    HEX_ODD_ROW.to_vec()
                } else {
                    HEX_EVEN_ROW.to_vec()
                }
            }
            Self::TriangularEdge => {
                if points_up(row, col) {
                    TRI_EDGE_UP.to_vec()
                } else {
                    TRI_EDGE_DOWN.to_vec()
                }
            }
            Self::TriangularFull => {
                if points_up(row, col) {
                    TRI_FULL_UP.to_vec()
                } else {
                    TRI_FULL_DOWN.to_vec()
                }
            }
            Self::Composite { parts, dedup } => {
                let mut seen = BTreeSet::new();
                let mut offsets = Vec::new();
                for part in parts {
                    for offset in part.offsets(row, col) {
                        if !*dedup || seen.insert(offset) {
                            offsets.push(offset);
                        }
                    }
                }
                offsets
            }
        }
    }

    /// Largest absolute row or column offset this strategy can produce.
    pub fn radius(&self) -> usize {
        match self {
            Self::Moore | Self::VonNeumann | Self::Hexagonal | Self::TriangularEdge => 1,
            Self::TriangularFull => 2,
            Self::Composite { parts, .. } => {
                parts.iter().map(Self::radius).max().unwrap_or(0)
            }
        }
    }

    /// Which coordinate parities the offsets of this strategy follow.
    pub fn parity_lock(&self) -> ParityLock {
        match self {
            Self::Moore | Self::VonNeumann => ParityLock::default(),
            Self::Hexagonal => ParityLock {
                row: true,
                diagonal: false,
            },
            Self::TriangularEdge | Self::TriangularFull => ParityLock {
                row: false,
                diagonal: true,
            },
            Self::Composite { parts, .. } => parts
                .iter()
                .map(Self::parity_lock)
                .fold(ParityLock::default(), ParityLock::union),
        }
    }
}

/// Whether the triangle at `(row, col)` points up.
pub const fn points_up(row: usize, col: usize) -> bool {
    (row ^ col) & 1 == 0
}
