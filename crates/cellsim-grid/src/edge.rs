//! Edge strategies: how coordinates outside the grid are handled.
//!
//! Strategies are stateless. They take the grid dimensions and a signed
//! candidate coordinate and either reject it or map it to one in-range
//! [`Position`].

use cellsim_types::{EdgePolicy, Position};
use serde::{Deserialize, Serialize};

/// Boundary handling for neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStrategy {
    /// Reject anything outside `0..rows` x `0..cols`.
    #[default]
    Bounded,
    /// Wrap both axes modulo the grid dimensions.
    Toroidal,
    /// Reflect about the boundary: `-1` maps to `0` and `rows` to `rows - 1`.
    Mirror,
    /// In-range lookups only; the owning grid grows before content reaches
    /// the boundary.
    Infinite,
}

impl EdgeStrategy {
    /// Whether `(row, col)` maps to a cell under this strategy.
    pub fn is_valid(self, rows: usize, cols: usize, row: isize, col: isize) -> bool {
        self.resolve(rows, cols, row, col).is_some()
    }

    /// Map `(row, col)` to a concrete cell, or `None` if it is rejected.
    pub fn resolve(self, rows: usize, cols: usize, row: isize, col: isize) -> Option<Position> {
        let (row, col) = match self {
            Self::Bounded | Self::Infinite => (in_range(row, rows)?, in_range(col, cols)?),
            Self::Toroidal => (wrap(row, rows)?, wrap(col, cols)?),
            Self::Mirror => (reflect(row, rows)?, reflect(col, cols)?),
        };
        Some(Position::new(row, col))
    }

    /// Whether this strategy needs a growable grid.
    pub const fn requires_growth(self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl From<EdgePolicy> for EdgeStrategy {
    fn from(policy: EdgePolicy) -> Self {
        match policy {
            EdgePolicy::Bounded => Self::Bounded,
            EdgePolicy::Toroidal => Self::Toroidal,
            EdgePolicy::Mirror => Self::Mirror,
            EdgePolicy::Infinite => Self::Infinite,
        }
    }
}

fn in_range(index: isize, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|i| *i < len)
}

fn wrap(index: isize, len: usize) -> Option<usize> {
    let len = isize::try_from(len).ok()?;
    usize::try_from(index.checked_rem_euclid(len)?).ok()
}

fn reflect(index: isize, len: usize) -> Option<usize> {
    let len_signed = isize::try_from(len).ok()?;
    let max = len_signed.checked_sub(1)?;
    if max < 0 {
        return None;
    }
    let reflected = if index < 0 {
        index.checked_neg()?.checked_sub(1)?
    } else if index > max {
        len_signed.checked_mul(2)?.checked_sub(index)?.checked_sub(1)?
    } else {
        index
    };
    usize::try_from(reflected.clamp(0, max)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_rejects_out_of_range() {
        let edge = EdgeStrategy::Bounded;
        assert!(!edge.is_valid(5, 5, -1, 0));
        assert!(!edge.is_valid(5, 5, 0, 5));
        assert!(!edge.is_valid(5, 5, 5, 5));
        assert_eq!(edge.resolve(5, 5, 4, 4), Some(Position::new(4, 4)));
    }

    #[test]
    fn toroidal_wraps_both_axes() {
        let edge = EdgeStrategy::Toroidal;
        assert_eq!(edge.resolve(5, 7, -1, 3), Some(Position::new(4, 3)));
        assert_eq!(edge.resolve(5, 7, 2, 7), Some(Position::new(2, 0)));
        assert_eq!(edge.resolve(5, 7, -6, -8), Some(Position::new(4, 6)));
    }

    #[test]
    fn mirror_reflects_about_boundary() {
        let edge = EdgeStrategy::Mirror;
        assert_eq!(edge.resolve(5, 5, -1, 2), Some(Position::new(0, 2)));
        assert_eq!(edge.resolve(5, 5, 5, 2), Some(Position::new(4, 2)));
        assert_eq!(edge.resolve(5, 5, -2, 6), Some(Position::new(1, 3)));
    }

    #[test]
    fn infinite_only_accepts_in_range() {
        let edge = EdgeStrategy::Infinite;
        assert!(edge.requires_growth());
        assert!(!edge.is_valid(3, 3, 3, 0));
        assert!(edge.is_valid(3, 3, 2, 0));
    }
}
