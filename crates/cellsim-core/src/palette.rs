//! State to color token mapping.

use std::collections::BTreeMap;

use cellsim_grid::Grid;
use cellsim_types::CellState;

use crate::config::ConfigError;

/// Color tokens for every state of one alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette<S> {
    colors: BTreeMap<S, String>,
}

impl<S: CellState> Default for Palette<S> {
    fn default() -> Self {
        Self {
            colors: S::ALL
                .iter()
                .map(|state| (*state, state.default_color().to_owned()))
                .collect(),
        }
    }
}

impl<S: CellState> Palette<S> {
    /// Default colors with the given overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming every unknown state code.
    pub fn with_overrides(overrides: &BTreeMap<i32, String>) -> Result<Self, ConfigError> {
        let mut palette = Self::default();
        let mut problems = Vec::new();
        for (code, token) in overrides {
            match S::from_code(*code) {
                Some(state) => {
                    palette.colors.insert(state, token.clone());
                }
                None => problems.push(format!("no state with code {code} to color")),
            }
        }
        if problems.is_empty() {
            Ok(palette)
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }

    /// Color token for `state`.
    pub fn color(&self, state: S) -> &str {
        self.colors
            .get(&state)
            .map_or_else(|| state.default_color(), String::as_str)
    }

    /// Color tokens of a whole grid, row by row.
    pub fn color_map(&self, grid: &Grid<S>) -> Vec<Vec<String>> {
        grid.cells()
            .chunks(grid.cols().max(1))
            .map(|row| {
                row.iter()
                    .map(|cell| self.color(cell.current()).to_owned())
                    .collect()
            })
            .collect()
    }
}
