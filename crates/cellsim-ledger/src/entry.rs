//! Ledger entries and the rules for who may send what to whom.

use cellsim_types::{AgentId, Position, Resource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Who holds a quantity of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Holder {
    /// Outside the simulation: the source of growback, the sink of
    /// metabolism and death.
    Void,
    /// The resource field at a grid cell.
    Field(Position),
    /// An agent.
    Agent(AgentId),
}

impl Holder {
    const fn kind(self) -> HolderKind {
        match self {
            Self::Void => HolderKind::Void,
            Self::Field(_) => HolderKind::Field,
            Self::Agent(_) => HolderKind::Agent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HolderKind {
    Void,
    Field,
    Agent,
}

impl core::fmt::Display for HolderKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Void => "void",
            Self::Field => "field",
            Self::Agent => "agent",
        };
        write!(f, "{name}")
    }
}

/// Why a quantity moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// A field cell regrew toward its capacity. Void to field.
    Growback,
    /// An agent collected a field cell. Field to agent.
    Harvest,
    /// An agent burned resources to live. Agent to void.
    Metabolism,
    /// Two agents exchanged goods. Agent to agent.
    Trade,
    /// A lender advanced principal. Agent to agent.
    LoanIssue,
    /// A borrower paid a lender. Agent to agent.
    Repayment,
    /// A parent endowed a newborn. Agent to agent.
    BirthEndowment,
    /// A dead agent's holdings left the simulation. Agent to void.
    Death,
}

impl Flow {
    /// Expected `(from, to)` holder kinds.
    const fn endpoints(self) -> (HolderKind, HolderKind) {
        match self {
            Self::Growback => (HolderKind::Void, HolderKind::Field),
            Self::Harvest => (HolderKind::Field, HolderKind::Agent),
            Self::Metabolism | Self::Death => (HolderKind::Agent, HolderKind::Void),
            Self::Trade | Self::LoanIssue | Self::Repayment | Self::BirthEndowment => {
                (HolderKind::Agent, HolderKind::Agent)
            }
        }
    }

    /// Whether this flow brings new units into the simulation.
    pub const fn is_source(self) -> bool {
        matches!(self, Self::Growback)
    }

    /// Whether this flow removes units from the simulation.
    pub const fn is_sink(self) -> bool {
        matches!(self, Self::Metabolism | Self::Death)
    }

    /// Whether this flow moves units between holders inside the simulation.
    pub const fn is_internal(self) -> bool {
        !self.is_source() && !self.is_sink()
    }
}

/// One recorded movement of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Tick during which the movement happened.
    pub tick: u64,
    /// Why it happened.
    pub flow: Flow,
    /// What moved.
    pub resource: Resource,
    /// How much moved; always positive.
    pub quantity: Decimal,
    /// Previous holder.
    pub from: Holder,
    /// New holder.
    pub to: Holder,
}

impl LedgerEntry {
    /// Build an entry, checking the quantity and the holder kinds.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveQuantity`] for zero or negative
    /// quantities and [`LedgerError::InvalidHolder`] when a holder does not
    /// fit the flow.
    pub fn new(
        tick: u64,
        flow: Flow,
        resource: Resource,
        quantity: Decimal,
        from: Holder,
        to: Holder,
    ) -> Result<Self, LedgerError> {
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveQuantity { quantity });
        }
        let (expected_from, expected_to) = flow.endpoints();
        if from.kind() != expected_from {
            return Err(LedgerError::InvalidHolder {
                flow,
                side: "from",
                expected: expected_from.to_string(),
                actual: from.kind().to_string(),
            });
        }
        if to.kind() != expected_to {
            return Err(LedgerError::InvalidHolder {
                flow,
                side: "to",
                expected: expected_to.to_string(),
                actual: to.kind().to_string(),
            });
        }
        if from == to {
            return Err(LedgerError::SelfTransfer { flow });
        }
        Ok(Self {
            tick,
            flow,
            resource,
            quantity,
            from,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn harvest_runs_field_to_agent() {
        let entry = LedgerEntry::new(
            1,
            Flow::Harvest,
            Resource::Sugar,
            dec!(3),
            Holder::Field(Position::new(0, 0)),
            Holder::Agent(AgentId(1)),
        );
        assert!(entry.is_ok());
    }

    #[test]
    fn wrong_direction_rejected() {
        let entry = LedgerEntry::new(
            1,
            Flow::Growback,
            Resource::Sugar,
            dec!(1),
            Holder::Field(Position::new(0, 0)),
            Holder::Void,
        );
        assert!(matches!(
            entry,
            Err(LedgerError::InvalidHolder { side: "from", .. })
        ));
    }

    #[test]
    fn zero_and_negative_rejected() {
        for quantity in [dec!(0), dec!(-2)] {
            let entry = LedgerEntry::new(
                1,
                Flow::Trade,
                Resource::Spice,
                quantity,
                Holder::Agent(AgentId(1)),
                Holder::Agent(AgentId(2)),
            );
            assert!(matches!(
                entry,
                Err(LedgerError::NonPositiveQuantity { .. })
            ));
        }
    }

    #[test]
    fn agent_cannot_pay_itself() {
        let entry = LedgerEntry::new(
            1,
            Flow::Repayment,
            Resource::Sugar,
            dec!(1),
            Holder::Agent(AgentId(4)),
            Holder::Agent(AgentId(4)),
        );
        assert!(matches!(entry, Err(LedgerError::SelfTransfer { .. })));
    }

    #[test]
    fn entries_serialize_with_snake_case_tags() {
        let entry = LedgerEntry::new(
            2,
            Flow::LoanIssue,
            Resource::Sugar,
            dec!(8),
            Holder::Agent(AgentId(0)),
            Holder::Agent(AgentId(1)),
        )
        .unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json.get("flow").and_then(|v| v.as_str()), Some("loan_issue"));
        assert_eq!(json.get("resource").and_then(|v| v.as_str()), Some("sugar"));
        assert!(json.get("from").and_then(|v| v.get("agent")).is_some());
    }

    #[test]
    fn flow_classification() {
        assert!(Flow::Growback.is_source());
        assert!(Flow::Death.is_sink());
        assert!(Flow::BirthEndowment.is_internal());
        assert!(!Flow::Metabolism.is_internal());
    }
}
