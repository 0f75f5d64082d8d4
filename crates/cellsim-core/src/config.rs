//! Configuration loading and typed config structures for cellsim runs.
//!
//! A run is described by one YAML document. This module defines strongly
//! typed structs mirroring it, a loader, and [`SimulationConfig::validate`],
//! which collects every problem it finds into one [`ConfigError::Invalid`]
//! instead of stopping at the first.
//!
//! ```yaml
//! simulation: { model: game_of_life, seed: 42 }
//! grid: { width: 20, height: 20, edge: toroidal, shape: square, neighbors: complete }
//! initial:
//!   random_by_proportion: { 1: 0.25 }
//! rule: "B3/S23"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use cellsim_grid::DEFAULT_MAX_CELLS;
use cellsim_types::{CellShape, CellState, EdgePolicy, ModelKind, NeighborArrangement, Position};
use serde::{Deserialize, Serialize};

/// Tolerance used when summing floating-point proportions.
const PROPORTION_EPSILON: f64 = 1e-9;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible run.
    #[error("invalid configuration: {}", problems.join("; "))]
    Invalid {
        /// Every problem found, in the order checked.
        problems: Vec<String>,
    },

    /// A birth/survival rule string could not be parsed.
    #[error("invalid rule string {rule:?}: {reason}")]
    RuleString {
        /// The rule string as written.
        rule: String,
        /// Explanation of what is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl ConfigError {
    /// Wrap a single problem description.
    pub fn invalid(problem: impl Into<String>) -> Self {
        Self::Invalid {
            problems: vec![problem.into()],
        }
    }

    /// Merge two errors into one [`ConfigError::Invalid`], `self` first.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        let mut problems = self.into_problems();
        problems.extend(other.into_problems());
        Self::Invalid { problems }
    }

    fn into_problems(self) -> Vec<String> {
        match self {
            Self::Invalid { problems } => problems,
            other => vec![other.to_string()],
        }
    }
}

/// Top-level run configuration.
///
/// Every section is optional in YAML and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Model selection, metadata, and the random seed.
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Grid dimensions and topology.
    #[serde(default)]
    pub grid: GridConfig,

    /// Initial cell layout.
    #[serde(default)]
    pub initial: InitialConfig,

    /// Named numeric model parameters, such as `fireProb`.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,

    /// Birth/survival rule string for life-like models.
    #[serde(default)]
    pub rule: Option<String>,

    /// Color overrides keyed by state code.
    #[serde(default)]
    pub colors: BTreeMap<i32, String>,

    /// Run length for the command-line runner.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Look up a named parameter.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Look up a named parameter, falling back to `default` when absent.
    pub fn parameter_or(&self, name: &str, default: f64) -> f64 {
        self.parameter(name).unwrap_or(default)
    }

    /// Number of cells the configured grid starts with.
    pub const fn cell_count(&self) -> Option<usize> {
        self.grid.height.checked_mul(self.grid.width)
    }

    /// Check the configuration against the state alphabet `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every problem found.
    pub fn validate<S: CellState>(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        self.check_grid(&mut problems);
        self.check_initial::<S>(&mut problems);
        self.check_parameters(&mut problems);
        check_codes::<S>("color", self.colors.keys(), &mut problems);
        for (code, token) in &self.colors {
            if token.trim().is_empty() {
                problems.push(format!("color for state {code} is empty"));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }

    fn check_grid(&self, problems: &mut Vec<String>) {
        let grid = &self.grid;
        if grid.width == 0 || grid.height == 0 {
            problems.push(format!(
                "grid dimensions {}x{} must both be positive",
                grid.height, grid.width
            ));
        }
        match self.cell_count() {
            None => problems.push("grid dimensions overflow".to_owned()),
            Some(cells) if grid.edge == EdgePolicy::Infinite && cells > grid.max_cells => {
                problems.push(format!(
                    "grid of {cells} cells exceeds max_cells {}",
                    grid.max_cells
                ));
            }
            Some(_) => {}
        }
    }

    fn check_initial<S: CellState>(&self, problems: &mut Vec<String>) {
        let initial = &self.initial;
        let given = initial.initializer_names();
        if given.len() > 1 {
            problems.push(format!(
                "only one initializer may be given, found {}",
                given.join(", ")
            ));
        }
        let cells = self.cell_count().unwrap_or(0);

        if let Some(specs) = &initial.cells {
            let mut outside = Vec::new();
            let mut duplicates = Vec::new();
            let mut seen = BTreeSet::new();
            for spec in specs {
                let position = spec.position();
                if position.row >= self.grid.height || position.col >= self.grid.width {
                    outside.push(position.to_string());
                }
                if !seen.insert(position) {
                    duplicates.push(position.to_string());
                }
            }
            if !outside.is_empty() {
                problems.push(format!("cells outside the grid: {}", outside.join(", ")));
            }
            if !duplicates.is_empty() {
                problems.push(format!("cells given twice: {}", duplicates.join(", ")));
            }
            check_codes::<S>("initial cell", specs.iter().map(|s| &s.state), problems);
        }

        if let Some(states) = &initial.states {
            if states.len() != cells {
                problems.push(format!(
                    "flat state list has {} entries for {cells} cells",
                    states.len()
                ));
            }
            check_codes::<S>("flat state", states.iter(), problems);
        }

        if let Some(counts) = &initial.random_by_count {
            check_codes::<S>("random count", counts.keys(), problems);
            let total = counts
                .values()
                .try_fold(0_usize, |acc, n| acc.checked_add(*n));
            match total {
                Some(total) if total <= cells => {}
                Some(total) => problems.push(format!(
                    "random counts total {total}, more than the {cells} cells available"
                )),
                None => problems.push("random counts overflow".to_owned()),
            }
        }

        if let Some(proportions) = &initial.random_by_proportion {
            check_codes::<S>("random proportion", proportions.keys(), problems);
            let mut sum = 0.0_f64;
            for (code, share) in proportions {
                if !share.is_finite() || *share < 0.0 || *share > 1.0 {
                    problems.push(format!("proportion for state {code} must lie in [0, 1]"));
                } else {
                    sum += share;
                }
            }
            if sum > 1.0 + PROPORTION_EPSILON {
                problems.push(format!("proportions sum to {sum}, more than 1"));
            }
        }
    }

    fn check_parameters(&self, problems: &mut Vec<String>) {
        for (name, value) in &self.parameters {
            if !value.is_finite() || *value < 0.0 {
                problems.push(format!("parameter {name} must be a non-negative number"));
            } else if name.to_ascii_lowercase().contains("prob") && *value > 1.0 {
                problems.push(format!("probability parameter {name} must not exceed 1"));
            }
        }
    }
}

fn check_codes<'a, S: CellState>(
    what: &str,
    codes: impl Iterator<Item = &'a i32>,
    problems: &mut Vec<String>,
) {
    let unknown: BTreeSet<i32> = codes
        .copied()
        .filter(|code| S::from_code(*code).is_none())
        .collect();
    if !unknown.is_empty() {
        let listed: Vec<String> = unknown.iter().map(ToString::to_string).collect();
        problems.push(format!("unknown {what} state codes: {}", listed.join(", ")));
    }
}

/// Model selection and run metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Which rule engine to run.
    #[serde(default = "default_model")]
    pub model: ModelKind,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Author credit.
    #[serde(default)]
    pub author: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Seed for the run's random generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            title: String::new(),
            author: String::new(),
            description: String::new(),
            seed: default_seed(),
        }
    }
}

/// Grid dimensions and topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns.
    #[serde(default = "default_dimension")]
    pub width: usize,

    /// Number of rows.
    #[serde(default = "default_dimension")]
    pub height: usize,

    /// Boundary handling.
    #[serde(default)]
    pub edge: EdgePolicy,

    /// Cell shape.
    #[serde(default)]
    pub shape: CellShape,

    /// Which touching cells count as neighbors.
    #[serde(default)]
    pub neighbors: NeighborArrangement,

    /// Cell budget for grids with an infinite edge.
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_dimension(),
            height: default_dimension(),
            edge: EdgePolicy::default(),
            shape: CellShape::default(),
            neighbors: NeighborArrangement::default(),
            max_cells: default_max_cells(),
        }
    }
}

/// One explicitly placed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpec {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// State code.
    pub state: i32,
}

impl CellSpec {
    /// Position of the placed cell.
    pub const fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Initial layout. At most one field may be set; none means all default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialConfig {
    /// Explicit cells; everything else starts in the default state.
    #[serde(default)]
    pub cells: Option<Vec<CellSpec>>,

    /// Every cell's state code, row-major.
    #[serde(default)]
    pub states: Option<Vec<i32>>,

    /// Exact number of cells per state, placed at random.
    #[serde(default)]
    pub random_by_count: Option<BTreeMap<i32, usize>>,

    /// Probability of each state per cell.
    #[serde(default)]
    pub random_by_proportion: Option<BTreeMap<i32, f64>>,
}

impl InitialConfig {
    /// Names of the initializers present.
    pub fn initializer_names(&self) -> Vec<&'static str> {
        [
            ("cells", self.cells.is_some()),
            ("states", self.states.is_some()),
            ("random_by_count", self.random_by_count.is_some()),
            ("random_by_proportion", self.random_by_proportion.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

/// Run length for the command-line runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of steps to execute.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format of the runner's log lines.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

const fn default_model() -> ModelKind {
    ModelKind::GameOfLife
}

const fn default_seed() -> u64 {
    42
}

const fn default_dimension() -> usize {
    20
}

const fn default_max_cells() -> usize {
    DEFAULT_MAX_CELLS
}

const fn default_max_steps() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use cellsim_types::{FireState, LifeState};

    #[test]
    fn combined_errors_keep_every_problem() {
        let rule = ConfigError::RuleString {
            rule: "B9".to_owned(),
            reason: "digit 9 out of range".to_owned(),
        };
        let grid = ConfigError::Invalid {
            problems: vec!["grid width is 0".to_owned(), "grid height is 0".to_owned()],
        };
        match rule.combine(grid) {
            ConfigError::Invalid { problems } => {
                assert_eq!(problems.len(), 3);
                assert!(problems.first().is_some_and(|p| p.contains("B9")));
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    use super::*;

    fn problems(result: Result<(), ConfigError>) -> Vec<String> {
        match result {
            Err(ConfigError::Invalid { problems }) => problems,
            _ => Vec::new(),
        }
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = SimulationConfig::parse("{}");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.simulation.model, ModelKind::GameOfLife);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.grid.width, 20);
        assert_eq!(config.grid.edge, EdgePolicy::Bounded);
        assert_eq!(config.run.max_steps, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate::<LifeState>().is_ok());
    }

    #[test]
    fn full_document_parses() {
        let yaml = r##"
simulation: { model: spreading_fire, title: Forest, seed: 7 }
grid: { width: 8, height: 6, edge: toroidal, shape: hexagon, neighbors: cardinal }
initial:
  random_by_proportion: { 1: 0.5, 2: 0.01 }
parameters: { fireProb: 0.4, growProb: 0.01 }
colors: { 2: "#ff0000" }
run: { max_steps: 5 }
logging: { level: debug, format: json }
"##;
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.simulation.model, ModelKind::SpreadingFire);
        assert_eq!(config.grid.shape, CellShape::Hexagon);
        assert_eq!(config.grid.neighbors, NeighborArrangement::Cardinal);
        assert_eq!(config.cell_count(), Some(48));
        assert!(config.parameter("fireProb").is_some_and(|p| (p - 0.4).abs() < 1e-12));
        assert_eq!(config.colors.get(&2).map(String::as_str), Some("#ff0000"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate::<FireState>().is_ok());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(
            SimulationConfig::parse("grid: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn all_bad_cells_reported_together() {
        let yaml = r"
grid: { width: 3, height: 3 }
initial:
  cells:
    - { row: 5, col: 0, state: 1 }
    - { row: 0, col: 9, state: 1 }
    - { row: 1, col: 1, state: 1 }
    - { row: 1, col: 1, state: 1 }
    - { row: 2, col: 2, state: 7 }
";
        let config = SimulationConfig::parse(yaml).ok().unwrap_or_default();
        let found = problems(config.validate::<LifeState>());
        assert_eq!(found.len(), 3);
        assert!(found.iter().any(|p| p.contains("(5, 0)") && p.contains("(0, 9)")));
        assert!(found.iter().any(|p| p.contains("given twice: (1, 1)")));
        assert!(found.iter().any(|p| p.contains("unknown initial cell state codes: 7")));
    }

    #[test]
    fn several_initializers_rejected() {
        let mut config = SimulationConfig::default();
        config.initial.states = Some(vec![0; 400]);
        config.initial.random_by_count = Some(BTreeMap::from([(1, 3)]));
        let found = problems(config.validate::<LifeState>());
        assert_eq!(found.len(), 1);
        assert!(found.iter().any(|p| p.contains("states, random_by_count")));
    }

    #[test]
    fn counts_and_proportions_bounded() {
        let mut config = SimulationConfig::default();
        config.grid.width = 2;
        config.grid.height = 2;
        config.initial.random_by_count = Some(BTreeMap::from([(1, 5)]));
        assert_eq!(problems(config.validate::<LifeState>()).len(), 1);

        config.initial.random_by_count = None;
        config.initial.random_by_proportion = Some(BTreeMap::from([(1, 0.7), (2, 0.6)]));
        let found = problems(config.validate::<FireState>());
        assert!(found.iter().any(|p| p.contains("more than 1")));
    }

    #[test]
    fn parameter_ranges_checked() {
        let mut config = SimulationConfig::default();
        config.parameters.insert("fireProb".to_owned(), 1.5);
        config.parameters.insert("growbackRate".to_owned(), -1.0);
        config.parameters.insert("maxVision".to_owned(), 6.0);
        let found = problems(config.validate::<LifeState>());
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn zero_dimension_rejected() {
        let mut config = SimulationConfig::default();
        config.grid.width = 0;
        let found = problems(config.validate::<LifeState>());
        assert!(found.iter().any(|p| p.contains("must both be positive")));
    }
}
