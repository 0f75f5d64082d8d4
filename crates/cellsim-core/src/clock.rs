//! Step counter for simulations.
//!
//! The clock is the single source of truth for how many steps a simulation
//! has completed. It only moves forward through checked arithmetic and is
//! reset by reinitialization.

use crate::error::SimulationError;

/// Counts completed steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepClock {
    tick: u64,
}

impl StepClock {
    /// A clock at tick zero.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Number of completed steps.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The tick the next step will complete.
    pub const fn upcoming(&self) -> Option<u64> {
        self.tick.checked_add(1)
    }

    /// Advance by one step and return the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::TickOverflow`] at `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, SimulationError> {
        self.tick = self.upcoming().ok_or(SimulationError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Whether `tick` falls on a multiple of `interval`.
    ///
    /// An interval of zero never fires.
    pub const fn every(tick: u64, interval: u64) -> bool {
        match tick.checked_rem(interval) {
            Some(rem) => rem == 0,
            None => false,
        }
    }

    /// Return to tick zero.
    pub const fn reset(&mut self) {
        self.tick = 0;
    }
}
