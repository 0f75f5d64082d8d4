//! Sugar loans between agents.
//!
//! A loan records principal, rate and term in [`Decimal`]. When it falls
//! due the borrower owes `principal * (1 + rate)`, rounded to whole units
//! half away from zero. A borrower who can pay does so and the loan closes.
//! One who cannot pays half its sugar; the loan closes and the remainder is
//! reissued as a fresh loan at the same rate and term.
//!
//! At most one loan exists between any two agents, in either direction.

use std::collections::BTreeMap;

use cellsim_types::{AgentId, LoanId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::EconomyError;

/// An outstanding loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    /// Unique identifier, assigned in issue order.
    pub id: LoanId,
    /// Agent owed the money.
    pub lender: AgentId,
    /// Agent owing the money.
    pub borrower: AgentId,
    /// Sugar advanced.
    pub principal: Decimal,
    /// Interest over the term.
    pub interest_rate: Decimal,
    /// Tick the loan was issued.
    pub issued_at: u64,
    /// Tick the loan falls due.
    pub due_at: u64,
}

impl Loan {
    /// Whole units owed at maturity.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ArithmeticOverflow`] if the amount does not
    /// fit in a holding.
    pub fn amount_due(&self) -> Result<u32, EconomyError> {
        let factor = Decimal::ONE
            .checked_add(self.interest_rate)
            .ok_or_else(|| EconomyError::overflow("loan interest factor"))?;
        self.principal
            .checked_mul(factor)
            .map(|owed| owed.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|owed| owed.to_u32())
            .ok_or_else(|| EconomyError::overflow(format!("amount due on {}", self.id)))
    }

    /// Length of the loan term in ticks.
    pub const fn term(&self) -> u64 {
        self.due_at.saturating_sub(self.issued_at)
    }

    /// Whether `agent` is party to this loan.
    pub fn involves(&self, agent: AgentId) -> bool {
        self.lender == agent || self.borrower == agent
    }
}

/// How a matured loan was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Paid in full; the loan is closed.
    Full {
        /// Sugar paid to the lender.
        paid: u32,
    },
    /// Paid in part; the remainder was reissued.
    Partial {
        /// Sugar paid to the lender.
        paid: u32,
        /// The loan carrying the remainder.
        reissued: LoanId,
        /// Principal of the reissued loan.
        remainder: u32,
    },
}

impl Settlement {
    /// Sugar paid to the lender.
    pub const fn paid(&self) -> u32 {
        match self {
            Self::Full { paid } | Self::Partial { paid, .. } => *paid,
        }
    }
}

/// All outstanding loans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanBook {
    loans: BTreeMap<LoanId, Loan>,
    next_id: LoanId,
}

impl LoanBook {
    /// Create an empty book.
    pub const fn new() -> Self {
        Self {
            loans: BTreeMap::new(),
            next_id: LoanId(0),
        }
    }

    /// Number of outstanding loans.
    pub fn len(&self) -> usize {
        self.loans.len()
    }

    /// Whether no loans are outstanding.
    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Look up a loan.
    pub fn get(&self, id: LoanId) -> Option<&Loan> {
        self.loans.get(&id)
    }

    /// Iterate over outstanding loans in issue order.
    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    /// Whether a loan exists between `a` and `b` in either direction.
    pub fn has_loan_between(&self, a: AgentId, b: AgentId) -> bool {
        self.loans.values().any(|loan| {
            (loan.lender == a && loan.borrower == b) || (loan.lender == b && loan.borrower == a)
        })
    }

    /// Record a new loan.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidAgent`] for a self-loan or a loan
    /// between agents already linked by one, and
    /// [`EconomyError::ArithmeticOverflow`] if the due tick or id overflows.
    pub fn issue(
        &mut self,
        lender: AgentId,
        borrower: AgentId,
        principal: u32,
        interest_rate: Decimal,
        tick: u64,
        term: u64,
    ) -> Result<LoanId, EconomyError> {
        if lender == borrower {
            return Err(EconomyError::InvalidAgent {
                reason: format!("{lender} cannot lend to itself"),
            });
        }
        if self.has_loan_between(lender, borrower) {
            return Err(EconomyError::InvalidAgent {
                reason: format!("a loan already links {lender} and {borrower}"),
            });
        }
        let due_at = tick
            .checked_add(term)
            .ok_or_else(|| EconomyError::overflow("loan due tick"))?;
        let id = self.next_id;
        self.next_id = id
            .next()
            .ok_or_else(|| EconomyError::overflow("loan id space exhausted"))?;
        self.loans.insert(
            id,
            Loan {
                id,
                lender,
                borrower,
                principal: Decimal::from(principal),
                interest_rate,
                issued_at: tick,
                due_at,
            },
        );
        Ok(id)
    }

    /// Ids of loans due at or before `tick`, in issue order.
    pub fn due(&self, tick: u64) -> Vec<LoanId> {
        self.loans
            .values()
            .filter(|loan| loan.due_at <= tick)
            .map(|loan| loan.id)
            .collect()
    }

    /// Settle a matured loan against a borrower holding `borrower_sugar`.
    ///
    /// The caller moves the sugar reported by [`Settlement::paid`].
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::LoanNotFound`] if the loan is not outstanding
    /// and [`EconomyError::ArithmeticOverflow`] if an amount overflows.
    pub fn settle(
        &mut self,
        id: LoanId,
        borrower_sugar: u32,
        tick: u64,
    ) -> Result<Settlement, EconomyError> {
        let loan = self
            .loans
            .remove(&id)
            .ok_or(EconomyError::LoanNotFound(id))?;
        let due = loan.amount_due()?;
        if borrower_sugar >= due {
            return Ok(Settlement::Full { paid: due });
        }
        let paid = borrower_sugar.checked_div(2).unwrap_or(0);
        let remainder = due.saturating_sub(paid);
        let reissued = self.issue(
            loan.lender,
            loan.borrower,
            remainder,
            loan.interest_rate,
            tick,
            loan.term(),
        )?;
        Ok(Settlement::Partial {
            paid,
            reissued,
            remainder,
        })
    }

    /// Drop every loan `agent` is party to. Returns how many were dropped.
    pub fn forget(&mut self, agent: AgentId) -> usize {
        let before = self.loans.len();
        self.loans.retain(|_, loan| !loan.involves(agent));
        before.saturating_sub(self.loans.len())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const LENDER: AgentId = AgentId(1);
    const BORROWER: AgentId = AgentId(2);

    #[test]
    fn amount_due_rounds_half_away_from_zero() {
        let mut book = LoanBook::new();
        let id = book.issue(LENDER, BORROWER, 5, dec!(0.1), 0, 10).unwrap();
        // 5 * 1.1 = 5.5 -> 6
        assert_eq!(book.get(id).unwrap().amount_due().unwrap(), 6);
        assert_eq!(book.get(id).unwrap().due_at, 10);
    }

    #[test]
    fn one_loan_per_pair() {
        let mut book = LoanBook::new();
        book.issue(LENDER, BORROWER, 5, dec!(0.1), 0, 10).unwrap();
        assert!(book.issue(BORROWER, LENDER, 5, dec!(0.1), 0, 10).is_err());
        assert!(book.issue(LENDER, LENDER, 5, dec!(0.1), 0, 10).is_err());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn full_repayment_closes_the_loan() {
        let mut book = LoanBook::new();
        let id = book.issue(LENDER, BORROWER, 10, dec!(0.1), 0, 5).unwrap();
        assert!(book.due(4).is_empty());
        assert_eq!(book.due(5), vec![id]);
        let settlement = book.settle(id, 30, 5).unwrap();
        assert_eq!(settlement, Settlement::Full { paid: 11 });
        assert!(book.is_empty());
    }

    #[test]
    fn partial_repayment_reissues_the_remainder() {
        let mut book = LoanBook::new();
        let id = book.issue(LENDER, BORROWER, 10, dec!(0.1), 0, 5).unwrap();
        let settlement = book.settle(id, 7, 5).unwrap();
        let Settlement::Partial {
            paid,
            reissued,
            remainder,
        } = settlement
        else {
            panic!("expected a partial settlement, got {settlement:?}");
        };
        assert_eq!(paid, 3);
        assert_eq!(remainder, 8);
        assert!(book.get(id).is_none());
        let renewed = book.get(reissued).unwrap();
        assert_eq!(renewed.principal, dec!(8));
        assert_eq!(renewed.interest_rate, dec!(0.1));
        assert_eq!(renewed.due_at, 10);
        // 8 * 1.1 = 8.8 -> 9
        assert_eq!(renewed.amount_due().unwrap(), 9);
    }

    #[test]
    fn forget_drops_both_sides() {
        let mut book = LoanBook::new();
        book.issue(LENDER, BORROWER, 1, dec!(0), 0, 1).unwrap();
        book.issue(AgentId(3), LENDER, 1, dec!(0), 0, 1).unwrap();
        book.issue(AgentId(3), AgentId(4), 1, dec!(0), 0, 1).unwrap();
        assert_eq!(book.forget(LENDER), 2);
        assert_eq!(book.len(), 1);
    }
}
