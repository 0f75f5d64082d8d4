//! The resource ledger: running totals plus the current tick's entries.
//!
//! # Design
//!
//! - **Double-entry**: every movement names a source and a destination.
//! - **Running totals**: opening balances, sources, and sinks accumulate
//!   over the whole run, so the expected stock of a resource is always
//!   `opening + sources - sinks`.
//! - **Bounded memory**: only the current tick's entries are retained.
//! - **Precision**: all quantities use [`Decimal`].

use std::collections::BTreeMap;

use cellsim_types::Resource;
use rust_decimal::Decimal;
use tracing::debug;

use crate::LedgerError;
use crate::conservation::{ConservationResult, audit_stock, verify_internal_flows};
use crate::entry::{Flow, Holder, LedgerEntry};

/// Tracks every resource movement in an agent economy.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    tick: u64,
    entries: Vec<LedgerEntry>,
    opening: BTreeMap<Resource, Decimal>,
    sources: BTreeMap<Resource, Decimal>,
    sinks: BTreeMap<Resource, Decimal>,
}

impl Ledger {
    /// Create an empty ledger at tick zero.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            entries: Vec::new(),
            opening: BTreeMap::new(),
            sources: BTreeMap::new(),
            sinks: BTreeMap::new(),
        }
    }

    /// Add `quantity` to the opening balance of `resource`.
    ///
    /// Called while the initial field and population are laid out.
    pub fn open(&mut self, resource: Resource, quantity: u64) -> Result<(), LedgerError> {
        add(&mut self.opening, resource, Decimal::from(quantity))
    }

    /// Start a new tick, discarding the previous tick's entries.
    pub fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
        self.entries.clear();
    }

    /// The tick entries are being recorded for.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Entries recorded during the current tick.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Record a movement. A zero quantity records nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidHolder`] or
    /// [`LedgerError::SelfTransfer`] for malformed movements and
    /// [`LedgerError::Overflow`] if a running total overflows.
    pub fn record(
        &mut self,
        flow: Flow,
        resource: Resource,
        quantity: u64,
        from: Holder,
        to: Holder,
    ) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Ok(());
        }
        let entry = LedgerEntry::new(
            self.tick,
            flow,
            resource,
            Decimal::from(quantity),
            from,
            to,
        )?;
        if flow.is_source() {
            add(&mut self.sources, resource, entry.quantity)?;
        } else if flow.is_sink() {
            add(&mut self.sinks, resource, entry.quantity)?;
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Opening balance of `resource`.
    pub fn opening(&self, resource: Resource) -> Decimal {
        self.opening.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// Units of `resource` created so far.
    pub fn total_sources(&self, resource: Resource) -> Decimal {
        self.sources.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// Units of `resource` destroyed so far.
    pub fn total_sinks(&self, resource: Resource) -> Decimal {
        self.sinks.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// The stock of `resource` the recorded history implies.
    pub fn expected_stock(&self, resource: Resource) -> Option<Decimal> {
        self.opening(resource)
            .checked_add(self.total_sources(resource))?
            .checked_sub(self.total_sinks(resource))
    }

    /// Check that this tick's internal movements balance.
    pub fn verify_tick(&self) -> ConservationResult {
        verify_internal_flows(self.tick, &self.entries)
    }

    /// Compare an observed stock of `resource` with the expected one.
    pub fn audit(&self, resource: Resource, observed: u64) -> ConservationResult {
        let result = audit_stock(
            self.tick,
            resource,
            self.expected_stock(resource),
            Decimal::from(observed),
        );
        debug!(
            tick = self.tick,
            resource = ?resource,
            observed,
            balanced = matches!(result, ConservationResult::Balanced),
            "Ledger audit"
        );
        result
    }
}

fn add(
    totals: &mut BTreeMap<Resource, Decimal>,
    resource: Resource,
    quantity: Decimal,
) -> Result<(), LedgerError> {
    let total = totals.entry(resource).or_insert(Decimal::ZERO);
    *total = total
        .checked_add(quantity)
        .ok_or(LedgerError::Overflow { resource })?;
    Ok(())
}
