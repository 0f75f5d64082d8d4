//! The resource field: sugar and spice lying on every grid cell.
//!
//! Capacities form two sugar hills (north-east and south-west quadrant
//! centers) and two spice hills (north-west and south-east). A cell's
//! capacity falls by one unit per band of Manhattan distance from the
//! nearest peak of its resource. Every cell starts full.

use cellsim_types::{Position, Resource};
use serde::Serialize;

use crate::error::EconomyError;

/// Resources on one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldCell {
    /// Sugar present.
    pub sugar: u32,
    /// Most sugar the cell can hold.
    pub sugar_capacity: u32,
    /// Spice present.
    pub spice: u32,
    /// Most spice the cell can hold.
    pub spice_capacity: u32,
}

impl FieldCell {
    /// Sugar plus spice present.
    pub const fn wealth(&self) -> u32 {
        self.sugar.saturating_add(self.spice)
    }
}

/// Units regrown on one cell during a growback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regrowth {
    /// The cell that regrew.
    pub position: Position,
    /// Sugar added.
    pub sugar: u32,
    /// Spice added.
    pub spice: u32,
}

/// Row-major field of [`FieldCell`]s matching the grid's dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceField {
    rows: usize,
    cols: usize,
    cells: Vec<FieldCell>,
}

impl ResourceField {
    /// Lay out the two-hill landscape, every cell at capacity.
    pub fn two_hills(rows: usize, cols: usize, max_sugar: u32, max_spice: u32) -> Self {
        let quarter = |n: usize| n.checked_div(4).unwrap_or(0);
        let three_quarters = |n: usize| n.saturating_mul(3).checked_div(4).unwrap_or(0);
        let sugar_peaks = [
            Position::new(quarter(rows), three_quarters(cols)),
            Position::new(three_quarters(rows), quarter(cols)),
        ];
        let spice_peaks = [
            Position::new(quarter(rows), quarter(cols)),
            Position::new(three_quarters(rows), three_quarters(cols)),
        ];

        let mut cells = Vec::with_capacity(rows.saturating_mul(cols));
        for row in 0..rows {
            for col in 0..cols {
                let here = Position::new(row, col);
                let sugar = capacity_at(here, &sugar_peaks, max_sugar, rows, cols);
                let spice = capacity_at(here, &spice_peaks, max_spice, rows, cols);
                cells.push(FieldCell {
                    sugar,
                    sugar_capacity: sugar,
                    spice,
                    spice_capacity: spice,
                });
            }
        }
        Self { rows, cols, cells }
    }

    /// Build a field from explicit cells in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::Imbalance`] when the cell count is not
    /// `rows * cols` or a cell holds more than its capacity.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: Vec<FieldCell>,
    ) -> Result<Self, EconomyError> {
        if rows.checked_mul(cols) != Some(cells.len()) {
            return Err(EconomyError::Imbalance(format!(
                "field of {} cells does not cover a {rows}x{cols} grid",
                cells.len()
            )));
        }
        if cells
            .iter()
            .any(|cell| cell.sugar > cell.sugar_capacity || cell.spice > cell.spice_capacity)
        {
            return Err(EconomyError::Imbalance(
                "field cell holds more than its capacity".to_owned(),
            ));
        }
        Ok(Self { rows, cols, cells })
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Resources at `position`.
    pub fn cell(&self, position: Position) -> Option<&FieldCell> {
        self.index_of(position).and_then(|index| self.cells.get(index))
    }

    fn index_of(&self, position: Position) -> Option<usize> {
        if position.row < self.rows && position.col < self.cols {
            position.index(self.cols)
        } else {
            None
        }
    }

    /// Sugar plus spice at `position`; zero outside the field.
    pub fn wealth(&self, position: Position) -> u32 {
        self.cell(position).map_or(0, FieldCell::wealth)
    }

    /// Take everything lying at `position`. Returns `(sugar, spice)`.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::Grid`] when the position is off the field.
    pub fn harvest(&mut self, position: Position) -> Result<(u32, u32), EconomyError> {
        let cell = self
            .index_of(position)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(cellsim_grid::GridError::OutOfBounds {
                row: position.row,
                col: position.col,
            })?;
        let taken = (cell.sugar, cell.spice);
        cell.sugar = 0;
        cell.spice = 0;
        Ok(taken)
    }

    /// Regrow every cell for which `skip` is false by up to `rate` units
    /// of each resource, never past capacity. Returns what grew.
    pub fn regrow<F>(&mut self, rate: u32, skip: F) -> Vec<Regrowth>
    where
        F: Fn(Position) -> bool,
    {
        let cols = self.cols;
        let mut grown = Vec::new();
        for (index, cell) in self.cells.iter_mut().enumerate() {
            let Some(position) = position_of(index, cols) else {
                continue;
            };
            if skip(position) {
                continue;
            }
            let sugar = rate.min(cell.sugar_capacity.saturating_sub(cell.sugar));
            let spice = rate.min(cell.spice_capacity.saturating_sub(cell.spice));
            if sugar == 0 && spice == 0 {
                continue;
            }
            cell.sugar = cell.sugar.saturating_add(sugar);
            cell.spice = cell.spice.saturating_add(spice);
            grown.push(Regrowth {
                position,
                sugar,
                spice,
            });
        }
        grown
    }

    /// Total `resource` lying on the field.
    pub fn total(&self, resource: Resource) -> u64 {
        self.cells
            .iter()
            .map(|cell| match resource {
                Resource::Sugar => u64::from(cell.sugar),
                Resource::Spice => u64::from(cell.spice),
            })
            .fold(0, u64::saturating_add)
    }

    /// Total capacity of `resource` across the field.
    pub fn capacity(&self, resource: Resource) -> u64 {
        self.cells
            .iter()
            .map(|cell| match resource {
                Resource::Sugar => u64::from(cell.sugar_capacity),
                Resource::Spice => u64::from(cell.spice_capacity),
            })
            .fold(0, u64::saturating_add)
    }
}

fn position_of(index: usize, cols: usize) -> Option<Position> {
    Some(Position::new(index.checked_div(cols)?, index.checked_rem(cols)?))
}

fn capacity_at(here: Position, peaks: &[Position], peak: u32, rows: usize, cols: usize) -> u32 {
    if peak == 0 {
        return 0;
    }
    let nearest = peaks
        .iter()
        .map(|p| here.manhattan(*p))
        .min()
        .unwrap_or(usize::MAX);
    let spread = usize::try_from(peak).unwrap_or(usize::MAX).saturating_mul(4);
    let band = rows
        .saturating_add(cols)
        .checked_div(spread)
        .unwrap_or(1)
        .max(1);
    let drop = nearest.checked_div(band).unwrap_or(usize::MAX);
    u32::try_from(drop).map_or(0, |drop| peak.saturating_sub(drop))
}
