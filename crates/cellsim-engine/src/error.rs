//! Error types for the engine and its runner binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode between reading a configuration file and printing the run summary.

/// Top-level error for the engine.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: cellsim_core::ConfigError,
    },

    /// Constructing or stepping the simulation failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: cellsim_core::SimulationError,
    },

    /// The run summary could not be serialized.
    #[error("output error: {source}")]
    Output {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The command line could not be understood.
    #[error("usage: {message}")]
    Usage {
        /// What was wrong with the arguments.
        message: String,
    },
}
