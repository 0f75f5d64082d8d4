//! Double-entry resource ledger for the cellsim agent economy.
//!
//! Every unit of sugar and spice in a Sugarscape run is tracked here. Units
//! enter the simulation only through growback and leave only through
//! metabolism or death; everything else (harvest, trade, lending, birth
//! endowments) moves units between holders. The stock audit runs at the end
//! of every tick.
//!
//! # Architecture
//!
//! - [`entry`] -- [`LedgerEntry`], [`Flow`], and [`Holder`] with per-flow
//!   validation of who may send to whom.
//! - [`ledger`] -- The [`Ledger`] struct: running totals and the current
//!   tick's entries.
//! - [`conservation`] -- Internal-balance verification and the stock audit.
//!
//! # Conservation Law
//!
//! For every resource R at the end of every tick:
//!
//! ```text
//! observed(R) == opening(R) + sources(R) - sinks(R)
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics; it
//! returns errors.
//!
//! | Flow | From | To |
//! |------|------|----|
//! | Growback | Void | Field |
//! | Harvest | Field | Agent |
//! | Metabolism | Agent | Void |
//! | Trade | Agent | Agent |
//! | `LoanIssue` | Agent | Agent |
//! | Repayment | Agent | Agent |
//! | `BirthEndowment` | Agent | Agent |
//! | Death | Agent | Void |
//!
//! # Usage
//!
//! ```
//! use cellsim_ledger::{ConservationResult, Flow, Holder, Ledger};
//! use cellsim_types::{AgentId, Position, Resource};
//!
//! let mut ledger = Ledger::new();
//! ledger.open(Resource::Sugar, 10).ok();
//! ledger.begin_tick(1);
//!
//! let cell = Holder::Field(Position::new(2, 3));
//! let agent = Holder::Agent(AgentId::from_raw(0));
//! ledger.record(Flow::Growback, Resource::Sugar, 1, Holder::Void, cell).ok();
//! ledger.record(Flow::Harvest, Resource::Sugar, 4, cell, agent).ok();
//! ledger.record(Flow::Metabolism, Resource::Sugar, 2, agent, Holder::Void).ok();
//!
//! assert_eq!(ledger.audit(Resource::Sugar, 9), ConservationResult::Balanced);
//! ```

pub mod conservation;
pub mod entry;
pub mod ledger;

pub use conservation::ConservationResult;
pub use entry::{Flow, Holder, LedgerEntry};
pub use ledger::Ledger;

use std::collections::BTreeMap;

use cellsim_types::Resource;
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Quantity must be strictly positive.
    #[error("ledger entry quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// The invalid quantity.
        quantity: Decimal,
    },

    /// A holder does not match the kind the flow requires.
    #[error("invalid holder for {flow:?} {side}: expected {expected}, got {actual}")]
    InvalidHolder {
        /// The flow being validated.
        flow: Flow,
        /// Which side of the entry ("from" or "to").
        side: &'static str,
        /// The expected holder kind.
        expected: String,
        /// The actual holder kind.
        actual: String,
    },

    /// Source and destination are the same holder.
    #[error("{flow:?} entry moves a resource to its own holder")]
    SelfTransfer {
        /// The flow being validated.
        flow: Flow,
    },

    /// A running total no longer fits in a decimal.
    #[error("running total overflow for {resource:?}")]
    Overflow {
        /// The resource whose total overflowed.
        resource: Resource,
    },
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation detected during a tick audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// Per-resource imbalance as (expected, observed). For the internal
    /// balance check these are (debits, credits).
    pub imbalances: BTreeMap<Resource, (Decimal, Decimal)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
