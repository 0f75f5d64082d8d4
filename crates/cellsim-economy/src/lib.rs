//! Sugarscape agent economy for the cellsim engine.
//!
//! Mobile agents harvest sugar and spice from a regrowing field, trade,
//! lend, reproduce, and pass diseases to their neighbors. The crate holds
//! the decision logic for each phase in its own module and drives them from
//! [`SugarscapeSimulation`], which implements the shared
//! [`Simulation`](cellsim_core::Simulation) contract. Every resource
//! movement is recorded in a [`cellsim_ledger::Ledger`] and audited at the
//! end of each step.
//!
//! # Modules
//!
//! - [`agent`] -- Agents, validated seeds, and the [`AgentRoster`]
//! - [`config`] -- Economy parameters ([`EconomyConfig`])
//! - [`death`] -- Death conditions ([`DeathCause`])
//! - [`disease`] -- Disease genomes, immune response, transmission
//! - [`error`] -- Error types for economy operations ([`EconomyError`])
//! - [`field`] -- The two-hill [`ResourceField`]
//! - [`loan`] -- Loans and the [`LoanBook`]
//! - [`movement`] -- Vision rays and destination choice
//! - [`reproduction`] -- Mating conditions and child construction
//! - [`sugarscape`] -- The step loop ([`SugarscapeSimulation`])
//! - [`trade`] -- Marginal rates of substitution and bilateral trade

pub mod agent;
pub mod config;
pub mod death;
pub mod disease;
pub mod error;
pub mod field;
pub mod loan;
pub mod movement;
pub mod reproduction;
pub mod sugarscape;
pub mod trade;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentRoster, AgentSeed};
pub use config::{EconomyConfig, params};
pub use death::{DeathCause, check_death};
pub use disease::{Disease, ImmuneOutcome, closest_window, immune_response};
pub use error::EconomyError;
pub use field::{FieldCell, ResourceField};
pub use loan::{Loan, LoanBook, Settlement};
pub use sugarscape::{EconomyStats, SugarscapeSimulation};
pub use trade::{Exchange, mrs, trade_pair, welfare};
