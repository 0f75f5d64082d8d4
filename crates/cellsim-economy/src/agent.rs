//! Agents and the roster that owns them.
//!
//! An [`Agent`] is a mobile holder of sugar and spice with inherited traits.
//! The [`AgentRoster`] owns every living agent, hands out sequential ids,
//! and keeps a position index so at most one agent stands on any cell.
//!
//! Founders and children are both built from an [`AgentSeed`], which is
//! validated before an id is spent: a missing position, a position outside
//! the grid, or a negative endowment is rejected.

use std::collections::BTreeMap;

use cellsim_types::{AgentId, Position, Resource, Sex};
use serde::Serialize;

use crate::disease::Disease;
use crate::error::EconomyError;

/// A living agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    /// Unique identifier, assigned in creation order.
    pub id: AgentId,
    /// Cell the agent stands on.
    pub position: Position,
    /// Sugar held.
    pub sugar: u32,
    /// Spice held.
    pub spice: u32,
    /// How many cells the agent sees along each cardinal ray.
    pub vision: u32,
    /// Sugar burned per step.
    pub sugar_metabolism: u32,
    /// Spice burned per step.
    pub spice_metabolism: u32,
    /// Biological sex.
    pub sex: Sex,
    /// Steps lived.
    pub age: u32,
    /// Inclusive age window in which the agent can reproduce.
    pub fertile_ages: (u32, u32),
    /// Sugar the agent started with.
    pub initial_sugar: u32,
    /// Spice the agent started with.
    pub initial_spice: u32,
    /// Diseases carried. The same disease may be carried more than once.
    pub diseases: Vec<Disease>,
    /// Immune bit string.
    pub immune: Vec<bool>,
}

impl Agent {
    /// Quantity of `resource` held.
    pub const fn holding(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Sugar => self.sugar,
            Resource::Spice => self.spice,
        }
    }

    /// Whether the agent's age falls inside its fertility window.
    pub const fn is_fertile_age(&self) -> bool {
        self.age >= self.fertile_ages.0 && self.age <= self.fertile_ages.1
    }

    /// Whether the agent can afford to endow a child: it holds at least
    /// its own starting endowment of every resource.
    pub const fn can_endow(&self) -> bool {
        self.sugar >= self.initial_sugar && self.spice >= self.initial_spice
    }

    /// Sugar burned this step, including the cost of carried diseases.
    pub fn sugar_burn(&self, per_disease: u32) -> u32 {
        let carried = u32::try_from(self.diseases.len()).unwrap_or(u32::MAX);
        self.sugar_metabolism
            .saturating_add(carried.saturating_mul(per_disease))
    }
}

/// Everything needed to create an agent, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSeed {
    /// Where the agent should stand.
    pub position: Option<Position>,
    /// Starting sugar.
    pub sugar: i64,
    /// Starting spice.
    pub spice: i64,
    /// Vision range.
    pub vision: u32,
    /// Sugar metabolism.
    pub sugar_metabolism: u32,
    /// Spice metabolism.
    pub spice_metabolism: u32,
    /// Biological sex.
    pub sex: Sex,
    /// Inclusive fertility window.
    pub fertile_ages: (u32, u32),
    /// Immune bit string.
    pub immune: Vec<bool>,
    /// Diseases carried from birth.
    pub diseases: Vec<Disease>,
}

impl AgentSeed {
    fn endowment(amount: i64, what: &str) -> Result<u32, EconomyError> {
        u32::try_from(amount).map_err(|err| EconomyError::InvalidAgent {
            reason: format!("{what} endowment {amount} is not a valid holding: {err}"),
        })
    }

    /// Validate the seed against a `rows` x `cols` grid and build the agent.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidAgent`] for a missing or out-of-grid
    /// position or a negative endowment.
    pub fn build(self, id: AgentId, rows: usize, cols: usize) -> Result<Agent, EconomyError> {
        let position = self.position.ok_or_else(|| EconomyError::InvalidAgent {
            reason: format!("{id} has no position"),
        })?;
        if position.row >= rows || position.col >= cols {
            return Err(EconomyError::InvalidAgent {
                reason: format!("{id} at {position} lies outside the {rows}x{cols} grid"),
            });
        }
        let sugar = Self::endowment(self.sugar, "sugar")?;
        let spice = Self::endowment(self.spice, "spice")?;
        Ok(Agent {
            id,
            position,
            sugar,
            spice,
            vision: self.vision,
            sugar_metabolism: self.sugar_metabolism,
            spice_metabolism: self.spice_metabolism,
            sex: self.sex,
            age: 0,
            fertile_ages: self.fertile_ages,
            initial_sugar: sugar,
            initial_spice: spice,
            diseases: self.diseases,
            immune: self.immune,
        })
    }
}

/// Owns every living agent and indexes them by position.
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    agents: BTreeMap<AgentId, Agent>,
    occupancy: BTreeMap<Position, AgentId>,
    next_id: AgentId,
}

impl AgentRoster {
    /// Create an empty roster. The first agent gets id zero.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            next_id: AgentId(0),
        }
    }

    /// Validate `seed` and add the agent it describes.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidAgent`] for an invalid seed,
    /// [`EconomyError::CellOccupied`] if another agent already stands
    /// there, and [`EconomyError::ArithmeticOverflow`] when ids run out.
    pub fn spawn(
        &mut self,
        seed: AgentSeed,
        rows: usize,
        cols: usize,
    ) -> Result<AgentId, EconomyError> {
        let id = self.next_id;
        let agent = seed.build(id, rows, cols)?;
        if let Some(&occupant) = self.occupancy.get(&agent.position) {
            return Err(EconomyError::CellOccupied {
                position: agent.position,
                occupant,
            });
        }
        self.next_id = id
            .next()
            .ok_or_else(|| EconomyError::overflow("agent id space exhausted"))?;
        self.occupancy.insert(agent.position, id);
        self.agents.insert(id, agent);
        Ok(id)
    }

    /// Number of living agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are alive.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Look up an agent mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::AgentNotFound`] for unknown ids.
    pub fn get_mut(&mut self, id: AgentId) -> Result<&mut Agent, EconomyError> {
        self.agents
            .get_mut(&id)
            .ok_or(EconomyError::AgentNotFound(id))
    }

    /// Mutable access to two distinct agents at once.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::AgentNotFound`] if either id is unknown or
    /// both ids are the same.
    pub fn pair_mut(
        &mut self,
        first: AgentId,
        second: AgentId,
    ) -> Result<(&mut Agent, &mut Agent), EconomyError> {
        if first == second {
            return Err(EconomyError::AgentNotFound(second));
        }
        let mut found_first = None;
        let mut found_second = None;
        for (id, agent) in &mut self.agents {
            if *id == first {
                found_first = Some(agent);
            } else if *id == second {
                found_second = Some(agent);
            }
        }
        match (found_first, found_second) {
            (Some(a), Some(b)) => Ok((a, b)),
            (None, _) => Err(EconomyError::AgentNotFound(first)),
            (_, None) => Err(EconomyError::AgentNotFound(second)),
        }
    }

    /// Living agent ids in ascending order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Iterate over living agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Agent standing on `position`, if any.
    pub fn occupant(&self, position: Position) -> Option<AgentId> {
        self.occupancy.get(&position).copied()
    }

    /// Whether an agent stands on `position`.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.occupancy.contains_key(&position)
    }

    /// Move an agent to an empty cell, vacating its old one.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::AgentNotFound`] for unknown ids and
    /// [`EconomyError::CellOccupied`] if another agent stands at `to`.
    pub fn relocate(&mut self, id: AgentId, to: Position) -> Result<(), EconomyError> {
        match self.occupancy.get(&to) {
            Some(&occupant) if occupant == id => return Ok(()),
            Some(&occupant) => {
                return Err(EconomyError::CellOccupied {
                    position: to,
                    occupant,
                });
            }
            None => {}
        }
        let agent = self.get_mut(id)?;
        let from = agent.position;
        agent.position = to;
        self.occupancy.remove(&from);
        self.occupancy.insert(to, id);
        Ok(())
    }

    /// Remove an agent, freeing its cell.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.agents.remove(&id)?;
        self.occupancy.remove(&agent.position);
        Some(agent)
    }

    /// Total `resource` held by all agents.
    pub fn total(&self, resource: Resource) -> u64 {
        self.agents
            .values()
            .map(|agent| u64::from(agent.holding(resource)))
            .fold(0, u64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(row: usize, col: usize) -> AgentSeed {
        AgentSeed {
            position: Some(Position::new(row, col)),
            sugar: 10,
            spice: 8,
            vision: 2,
            sugar_metabolism: 1,
            spice_metabolism: 1,
            sex: Sex::Female,
            fertile_ages: (2, 40),
            immune: vec![false; 4],
            diseases: Vec::new(),
        }
    }

    #[test]
    fn ids_are_sequential() {
        let mut roster = AgentRoster::new();
        let first = roster.spawn(seed(0, 0), 5, 5).unwrap();
        let second = roster.spawn(seed(0, 1), 5, 5).unwrap();
        assert_eq!(first, AgentId(0));
        assert_eq!(second, AgentId(1));
        assert_eq!(roster.total(Resource::Sugar), 20);
    }

    #[test]
    fn invalid_seeds_rejected() {
        let mut roster = AgentRoster::new();
        let mut missing = seed(0, 0);
        missing.position = None;
        assert!(matches!(
            roster.spawn(missing, 5, 5),
            Err(EconomyError::InvalidAgent { .. })
        ));
        assert!(roster.spawn(seed(5, 0), 5, 5).is_err());
        let mut negative = seed(1, 1);
        negative.spice = -1;
        assert!(roster.spawn(negative, 5, 5).is_err());
        assert!(roster.is_empty());
    }

    #[test]
    fn unrepresentable_endowment_names_the_cause() {
        let mut huge = seed(1, 1);
        huge.sugar = 4_294_967_296;
        match huge.build(AgentId(0), 5, 5) {
            Err(EconomyError::InvalidAgent { reason }) => {
                assert!(reason.starts_with("sugar endowment 4294967296"));
                assert!(reason.contains("out of range"));
            }
            other => panic!("expected an invalid agent, got {other:?}"),
        }
    }

    #[test]
    fn one_agent_per_cell() {
        let mut roster = AgentRoster::new();
        roster.spawn(seed(2, 2), 5, 5).unwrap();
        assert!(matches!(
            roster.spawn(seed(2, 2), 5, 5),
            Err(EconomyError::CellOccupied { .. })
        ));
    }

    #[test]
    fn relocate_updates_index() {
        let mut roster = AgentRoster::new();
        let id = roster.spawn(seed(1, 1), 5, 5).unwrap();
        roster.relocate(id, Position::new(1, 3)).unwrap();
        assert!(!roster.is_occupied(Position::new(1, 1)));
        assert_eq!(roster.occupant(Position::new(1, 3)), Some(id));
        roster.remove(id);
        assert!(!roster.is_occupied(Position::new(1, 3)));
    }

    #[test]
    fn fertility_window_and_endowment() {
        let mut roster = AgentRoster::new();
        let id = roster.spawn(seed(0, 0), 5, 5).unwrap();
        let agent = roster.get_mut(id).unwrap();
        assert!(!agent.is_fertile_age());
        agent.age = 2;
        assert!(agent.is_fertile_age());
        assert!(agent.can_endow());
        agent.sugar = 9;
        assert!(!agent.can_endow());
    }
}
