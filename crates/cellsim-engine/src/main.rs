//! Command-line runner for cellsim.
//!
//! ```text
//! cellsim-engine <config.yaml> [steps]
//! ```
//!
//! # Startup Sequence
//!
//! 1. Load and parse the configuration file
//! 2. Initialize structured logging (tracing), defaulting to `logging.level`
//! 3. Build the configured model
//! 4. Run `steps` steps (default `run.max_steps`)
//! 5. Print the run summary as JSON on stdout

use std::path::PathBuf;

use cellsim_core::{LogFormat, LoggingConfig, SimulationConfig};
use cellsim_engine::{EngineError, run};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point for the runner.
///
/// # Errors
///
/// Returns an error if the arguments, the configuration, or the run fail.
fn main() -> Result<(), EngineError> {
    let (path, steps) = parse_args(std::env::args().skip(1))?;

    let config = SimulationConfig::from_file(&path)?;
    init_logging(&config.logging);

    let steps = steps.unwrap_or(config.run.max_steps);
    info!(
        config = %path.display(),
        model = %config.simulation.model,
        seed = config.simulation.seed,
        steps,
        "cellsim-engine starting"
    );

    let summary = run(&config, steps)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Split the arguments into a config path and an optional step count.
fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<(PathBuf, Option<u64>), EngineError> {
    let path = args.next().map(PathBuf::from).ok_or_else(|| EngineError::Usage {
        message: "cellsim-engine <config.yaml> [steps]".to_owned(),
    })?;
    let steps = args
        .next()
        .map(|raw| {
            raw.parse::<u64>().map_err(|err| EngineError::Usage {
                message: format!("steps must be a non-negative integer, got {raw:?}: {err}"),
            })
        })
        .transpose()?;
    if let Some(extra) = args.next() {
        return Err(EngineError::Usage {
            message: format!("unexpected argument {extra:?}"),
        });
    }
    Ok((path, steps))
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
