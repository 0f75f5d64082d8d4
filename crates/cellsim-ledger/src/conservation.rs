//! Conservation checks for the resource ledger.
//!
//! Two checks run at the end of every tick:
//!
//! - **Internal balance**: for each resource, the units debited by internal
//!   movements (harvest, trade, lending, endowment) equal the units
//!   credited. Each well-formed entry adds the same quantity to both sides,
//!   so this holds by construction unless an entry is corrupted.
//! - **Stock audit**: the observed stock of a resource equals
//!   `opening + sources - sinks`.
//!
//! A failure of either produces a [`LedgerAnomaly`].

use std::collections::{BTreeMap, BTreeSet};

use cellsim_types::Resource;
use rust_decimal::Decimal;

use crate::LedgerAnomaly;
use crate::entry::{Holder, LedgerEntry};

/// Outcome of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Everything balances.
    Balanced,
    /// At least one resource is out of balance.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// The anomaly, if the check failed.
    pub const fn anomaly(&self) -> Option<&LedgerAnomaly> {
        match self {
            Self::Balanced => None,
            Self::Anomaly(anomaly) => Some(anomaly),
        }
    }
}

/// Verify that internal movements in `tick` balance for every resource.
pub fn verify_internal_flows(tick: u64, entries: &[LedgerEntry]) -> ConservationResult {
    let mut debits: BTreeMap<Resource, Decimal> = BTreeMap::new();
    let mut credits: BTreeMap<Resource, Decimal> = BTreeMap::new();

    for entry in entries
        .iter()
        .filter(|entry| entry.tick == tick && entry.flow.is_internal())
    {
        if entry.from == Holder::Void || entry.to == Holder::Void {
            return anomaly(
                tick,
                BTreeMap::from([(entry.resource, (entry.quantity, Decimal::ZERO))]),
                format!("internal {:?} movement touches the void", entry.flow),
            );
        }
        for side in [&mut debits, &mut credits] {
            let total = side.entry(entry.resource).or_insert(Decimal::ZERO);
            *total = match total.checked_add(entry.quantity) {
                Some(value) => value,
                None => {
                    return anomaly(
                        tick,
                        BTreeMap::from([(entry.resource, (Decimal::ZERO, Decimal::ZERO))]),
                        format!("arithmetic overflow while summing {:?}", entry.resource),
                    );
                }
            };
        }
    }

    let resources: BTreeSet<Resource> = debits.keys().chain(credits.keys()).copied().collect();
    let imbalances: BTreeMap<Resource, (Decimal, Decimal)> = resources
        .into_iter()
        .filter_map(|resource| {
            let debit = debits.get(&resource).copied().unwrap_or(Decimal::ZERO);
            let credit = credits.get(&resource).copied().unwrap_or(Decimal::ZERO);
            (debit != credit).then_some((resource, (debit, credit)))
        })
        .collect();

    if imbalances.is_empty() {
        ConservationResult::Balanced
    } else {
        let count = imbalances.len();
        anomaly(
            tick,
            imbalances,
            format!("internal movements unbalanced for {count} resource(s)"),
        )
    }
}

/// Compare an observed stock against the stock the ledger expects.
///
/// An `expected` of `None` means the running totals overflowed.
pub fn audit_stock(
    tick: u64,
    resource: Resource,
    expected: Option<Decimal>,
    observed: Decimal,
) -> ConservationResult {
    match expected {
        Some(expected) if expected == observed => ConservationResult::Balanced,
        Some(expected) => anomaly(
            tick,
            BTreeMap::from([(resource, (expected, observed))]),
            format!("{resource:?} stock is {observed}, ledger expects {expected}"),
        ),
        None => anomaly(
            tick,
            BTreeMap::from([(resource, (Decimal::ZERO, observed))]),
            format!("{resource:?} running totals overflowed"),
        ),
    }
}

fn anomaly(
    tick: u64,
    imbalances: BTreeMap<Resource, (Decimal, Decimal)>,
    detail: String,
) -> ConservationResult {
    ConservationResult::Anomaly(LedgerAnomaly {
        tick,
        imbalances,
        message: format!("LEDGER_ANOMALY at tick {tick}: {detail}"),
    })
}

#[cfg(test)]
mod tests {
    use cellsim_types::{AgentId, Position};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entry::Flow;

    fn trade(tick: u64, quantity: Decimal) -> LedgerEntry {
        LedgerEntry::new(
            tick,
            Flow::Trade,
            Resource::Sugar,
            quantity,
            Holder::Agent(AgentId(1)),
            Holder::Agent(AgentId(2)),
        )
        .unwrap()
    }

    #[test]
    fn well_formed_entries_balance() {
        let entries = vec![trade(3, dec!(2)), trade(3, dec!(5)), trade(4, dec!(1))];
        assert_eq!(verify_internal_flows(3, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn corrupted_entry_detected() {
        let mut corrupted = trade(3, dec!(2));
        corrupted.to = Holder::Void;
        let result = verify_internal_flows(3, &[corrupted]);
        assert!(matches!(result, ConservationResult::Anomaly(_)));
    }

    #[test]
    fn sources_and_sinks_are_not_internal() {
        let growback = LedgerEntry::new(
            3,
            Flow::Growback,
            Resource::Sugar,
            dec!(9),
            Holder::Void,
            Holder::Field(Position::new(0, 0)),
        )
        .unwrap();
        assert_eq!(verify_internal_flows(3, &[growback]), ConservationResult::Balanced);
    }

    #[test]
    fn stock_audit_reports_both_values() {
        let result = audit_stock(7, Resource::Spice, Some(dec!(10)), dec!(12));
        let anomaly = result.anomaly().unwrap();
        assert_eq!(anomaly.tick, 7);
        assert_eq!(
            anomaly.imbalances.get(&Resource::Spice),
            Some(&(dec!(10), dec!(12)))
        );
        assert!(anomaly.message.contains("LEDGER_ANOMALY"));
    }
}
