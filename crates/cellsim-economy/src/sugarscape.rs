//! The Sugarscape simulation: the economy's step loop.
//!
//! Each step runs the phases below against one seeded shuffle of the
//! living agents, then removes the dead, settles matured loans, mirrors
//! occupancy onto the grid, and audits the ledger:
//!
//! 1. movement, harvest, metabolism, aging
//! 2. field regrowth (every `growbackInterval` steps, unoccupied cells)
//! 3. reproduction
//! 4. trade (only with spice enabled)
//! 5. lending
//! 6. immune update
//! 7. disease transmission
//!
//! Every sugar and spice movement is recorded in the [`Ledger`]. A failed
//! audit is an invariant violation and stops the run.

use std::collections::BTreeSet;

use cellsim_core::{
    ConfigError, Palette, Simulation, SimulationConfig, SimulationError, StepClock, StepReport,
    build_initial_grid, seeded_rng,
};
use cellsim_grid::Grid;
use cellsim_ledger::{Flow, Holder, Ledger};
use cellsim_types::{
    AgentId, DiseaseId, EdgePolicy, ModelKind, Position, Resource, Sex, SugarscapeState,
};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use tracing::{debug, info};

use crate::agent::{AgentRoster, AgentSeed};
use crate::config::EconomyConfig;
use crate::death::{DeathCause, check_death};
use crate::disease::{Disease, immune_response, transmit};
use crate::error::EconomyError;
use crate::field::ResourceField;
use crate::loan::LoanBook;
use crate::movement::{cardinal_neighbors, choose_destination};
use crate::reproduction::{can_mate, child_seed, donation};
use crate::trade::trade_pair;

/// What happened during the most recent step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EconomyStats {
    /// Agents that changed cell.
    pub moved: usize,
    /// Children born.
    pub births: usize,
    /// Sugar-for-spice exchanges.
    pub exchanges: usize,
    /// Loans issued, not counting reissues.
    pub loans_issued: usize,
    /// Matured loans settled.
    pub settlements: usize,
    /// Disease exposures.
    pub exposures: usize,
    /// Diseases cleared by immune response.
    pub cleared: usize,
    /// Agents that died.
    pub deaths: usize,
}

/// The Sugarscape agent economy.
#[derive(Debug, Clone)]
pub struct SugarscapeSimulation {
    economy: EconomyConfig,
    grid: Grid<SugarscapeState>,
    palette: Palette<SugarscapeState>,
    clock: StepClock,
    rng: StdRng,
    field: ResourceField,
    roster: AgentRoster,
    loans: LoanBook,
    ledger: Ledger,
    last_step: EconomyStats,
}

impl SugarscapeSimulation {
    /// Build from a configuration whose model is `sugarscape`.
    ///
    /// Founders stand on the cells the initial layout marks as agents. If
    /// the layout marks none, `initialAgents` founders are scattered at
    /// random. Founder traits are drawn from the configured ranges.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let mut sim = Self::empty(config)?;
        let mut positions: Vec<Position> = sim
            .grid
            .cells()
            .iter()
            .filter(|cell| cell.current() == SugarscapeState::Agent)
            .map(|cell| cell.position())
            .collect();
        if positions.is_empty() && sim.economy.initial_agents > 0 {
            let mut all: Vec<Position> =
                sim.grid.cells().iter().map(|cell| cell.position()).collect();
            all.shuffle(&mut sim.rng);
            let wanted = usize::try_from(sim.economy.initial_agents).unwrap_or(usize::MAX);
            all.truncate(wanted);
            positions = all;
        }

        let pool: Vec<Disease> = (0..sim.economy.disease_count)
            .map(|raw| {
                Disease::random(
                    DiseaseId(u64::from(raw)),
                    sim.economy.disease_length,
                    &mut sim.rng,
                )
            })
            .collect();
        let seeds: Vec<AgentSeed> = positions
            .into_iter()
            .map(|position| founder_seed(position, &sim.economy, &pool, &mut sim.rng))
            .collect();
        sim.populate(seeds)?;
        Ok(sim)
    }

    /// Build from a configuration with an explicit field and population.
    ///
    /// The initial layout's agent cells are ignored; `seeds` decide where
    /// agents stand.
    pub fn with_population(
        config: &SimulationConfig,
        field: ResourceField,
        seeds: Vec<AgentSeed>,
    ) -> Result<Self, SimulationError> {
        let mut sim = Self::empty(config)?;
        if field.rows() != sim.grid.rows() || field.cols() != sim.grid.cols() {
            return Err(ConfigError::invalid(format!(
                "field is {}x{} but the grid is {}x{}",
                field.rows(),
                field.cols(),
                sim.grid.rows(),
                sim.grid.cols()
            ))
            .into());
        }
        sim.field = field;
        sim.populate(seeds)?;
        Ok(sim)
    }

    fn empty(config: &SimulationConfig) -> Result<Self, SimulationError> {
        if config.simulation.model != ModelKind::Sugarscape {
            return Err(ConfigError::invalid(format!(
                "model {} is not sugarscape",
                config.simulation.model
            ))
            .into());
        }
        if config.grid.edge == EdgePolicy::Infinite {
            return Err(
                ConfigError::invalid("sugarscape does not support the infinite edge").into(),
            );
        }
        let economy = EconomyConfig::from_parameters(config)?;
        let mut rng = seeded_rng(config.simulation.seed);
        let grid: Grid<SugarscapeState> = build_initial_grid(config, &mut rng)?;
        let palette = Palette::with_overrides(&config.colors)?;
        let field = ResourceField::two_hills(
            grid.rows(),
            grid.cols(),
            economy.max_sugar_capacity,
            economy.max_spice_capacity,
        );
        Ok(Self {
            economy,
            grid,
            palette,
            clock: StepClock::new(),
            rng,
            field,
            roster: AgentRoster::new(),
            loans: LoanBook::new(),
            ledger: Ledger::new(),
            last_step: EconomyStats::default(),
        })
    }

    fn populate(&mut self, seeds: Vec<AgentSeed>) -> Result<(), SimulationError> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        for seed in seeds {
            self.roster.spawn(seed, rows, cols).map_err(SimulationError::from)?;
        }
        for resource in [Resource::Sugar, Resource::Spice] {
            let opening = self.field.total(resource).saturating_add(self.roster.total(resource));
            self.ledger
                .open(resource, opening)
                .map_err(|err| SimulationError::from(EconomyError::from(err)))?;
        }
        self.sync_grid().map_err(SimulationError::from)?;
        info!(
            rows,
            cols,
            agents = self.roster.len(),
            sugar = self.total(Resource::Sugar),
            spice = self.total(Resource::Spice),
            "Sugarscape simulation created"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Resolved economy parameters.
    pub const fn economy(&self) -> &EconomyConfig {
        &self.economy
    }

    /// Living agents.
    pub const fn agents(&self) -> &AgentRoster {
        &self.roster
    }

    /// The resource field.
    pub const fn field(&self) -> &ResourceField {
        &self.field
    }

    /// Outstanding loans.
    pub const fn loans(&self) -> &LoanBook {
        &self.loans
    }

    /// The resource ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Counters from the most recent step.
    pub const fn last_step(&self) -> EconomyStats {
        self.last_step
    }

    /// Total `resource` on the field and held by agents.
    pub fn total(&self, resource: Resource) -> u64 {
        self.field
            .total(resource)
            .saturating_add(self.roster.total(resource))
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    fn record(
        &mut self,
        flow: Flow,
        resource: Resource,
        quantity: u32,
        from: Holder,
        to: Holder,
    ) -> Result<(), EconomyError> {
        self.ledger
            .record(flow, resource, u64::from(quantity), from, to)
            .map_err(EconomyError::from)
    }

    fn move_agents(
        &mut self,
        order: &[AgentId],
        stats: &mut EconomyStats,
    ) -> Result<(), EconomyError> {
        for &id in order {
            let Some(agent) = self.roster.get(id) else {
                continue;
            };
            let origin = agent.position;
            let destination = choose_destination(&self.grid, &self.field, &self.roster, agent);
            self.roster.relocate(id, destination)?;
            if destination != origin {
                stats.moved = stats.moved.saturating_add(1);
            }

            let (sugar, spice) = self.field.harvest(destination)?;
            let (field, holder) = (Holder::Field(destination), Holder::Agent(id));
            self.record(Flow::Harvest, Resource::Sugar, sugar, field, holder)?;
            self.record(Flow::Harvest, Resource::Spice, spice, field, holder)?;

            let per_disease = self.economy.disease_metabolism;
            let agent = self.roster.get_mut(id)?;
            agent.sugar = agent
                .sugar
                .checked_add(sugar)
                .ok_or_else(|| EconomyError::overflow(format!("{id} sugar after harvest")))?;
            agent.spice = agent
                .spice
                .checked_add(spice)
                .ok_or_else(|| EconomyError::overflow(format!("{id} spice after harvest")))?;
            let sugar_burn = agent.sugar.min(agent.sugar_burn(per_disease));
            let spice_burn = agent.spice.min(agent.spice_metabolism);
            agent.sugar = agent.sugar.saturating_sub(sugar_burn);
            agent.spice = agent.spice.saturating_sub(spice_burn);
            agent.age = agent.age.saturating_add(1);

            self.record(Flow::Metabolism, Resource::Sugar, sugar_burn, holder, Holder::Void)?;
            self.record(Flow::Metabolism, Resource::Spice, spice_burn, holder, Holder::Void)?;
        }
        Ok(())
    }

    fn regrow(&mut self) -> Result<(), EconomyError> {
        let roster = &self.roster;
        let grown = self
            .field
            .regrow(self.economy.growback_rate, |position| roster.is_occupied(position));
        for regrowth in grown {
            let cell = Holder::Field(regrowth.position);
            self.record(Flow::Growback, Resource::Sugar, regrowth.sugar, Holder::Void, cell)?;
            self.record(Flow::Growback, Resource::Spice, regrowth.spice, Holder::Void, cell)?;
        }
        Ok(())
    }

    fn reproduce(
        &mut self,
        order: &[AgentId],
        stats: &mut EconomyStats,
    ) -> Result<(), EconomyError> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let mut mated: BTreeSet<AgentId> = BTreeSet::new();
        for &id in order {
            if mated.contains(&id) {
                continue;
            }
            let Some(agent) = self.roster.get(id) else {
                continue;
            };
            if !agent.is_fertile_age() {
                continue;
            }

            let mut birth = None;
            for neighbor in cardinal_neighbors(&self.grid, agent.position) {
                let Some(mate_id) = self.roster.occupant(neighbor) else {
                    continue;
                };
                if mated.contains(&mate_id) {
                    continue;
                }
                let Some(mate) = self.roster.get(mate_id) else {
                    continue;
                };
                if !can_mate(agent, mate) {
                    continue;
                }
                let mut nursery: Vec<Position> = Vec::new();
                for position in cardinal_neighbors(&self.grid, agent.position)
                    .into_iter()
                    .chain(cardinal_neighbors(&self.grid, mate.position))
                {
                    if !self.roster.is_occupied(position) && !nursery.contains(&position) {
                        nursery.push(position);
                    }
                }
                let Some(&cradle) = nursery.choose(&mut self.rng) else {
                    continue;
                };
                let seed =
                    child_seed(agent, mate, cradle, self.economy.fertile_ages, &mut self.rng);
                birth = Some((mate_id, seed, donation(agent), donation(mate)));
                break;
            }

            let Some((mate_id, seed, from_agent, from_mate)) = birth else {
                continue;
            };
            let child = self.roster.spawn(seed, rows, cols)?;
            for (parent, gift) in [(id, from_agent), (mate_id, from_mate)] {
                let holder = self.roster.get_mut(parent)?;
                holder.sugar =
                    holder
                        .sugar
                        .checked_sub(gift.sugar)
                        .ok_or(EconomyError::Insufficient {
                            what: "sugar",
                            requested: gift.sugar,
                            available: holder.sugar,
                        })?;
                holder.spice =
                    holder
                        .spice
                        .checked_sub(gift.spice)
                        .ok_or(EconomyError::Insufficient {
                            what: "spice",
                            requested: gift.spice,
                            available: holder.spice,
                        })?;
                let (giver, newborn) = (Holder::Agent(parent), Holder::Agent(child));
                self.record(Flow::BirthEndowment, Resource::Sugar, gift.sugar, giver, newborn)?;
                self.record(Flow::BirthEndowment, Resource::Spice, gift.spice, giver, newborn)?;
            }
            mated.insert(id);
            mated.insert(mate_id);
            stats.births = stats.births.saturating_add(1);
            debug!(parent = %id, mate = %mate_id, child = %child, "Agent born");
        }
        Ok(())
    }

    fn trade(&mut self, order: &[AgentId], stats: &mut EconomyStats) -> Result<(), EconomyError> {
        let mut traded: BTreeSet<(AgentId, AgentId)> = BTreeSet::new();
        for &id in order {
            let Some(position) = self.roster.get(id).map(|agent| agent.position) else {
                continue;
            };
            for neighbor in cardinal_neighbors(&self.grid, position) {
                let Some(other) = self.roster.occupant(neighbor) else {
                    continue;
                };
                if !traded.insert((id.min(other), id.max(other))) {
                    continue;
                }
                let (first, second) = self.roster.pair_mut(id, other)?;
                let exchanges = trade_pair(first, second, self.economy.max_trades_per_pair);
                stats.exchanges = stats.exchanges.saturating_add(exchanges.len());
                for exchange in exchanges {
                    let seller = Holder::Agent(exchange.seller);
                    let buyer = Holder::Agent(exchange.buyer);
                    self.record(Flow::Trade, Resource::Sugar, exchange.sugar, seller, buyer)?;
                    self.record(Flow::Trade, Resource::Spice, exchange.spice, buyer, seller)?;
                }
            }
        }
        Ok(())
    }

    fn lend(
        &mut self,
        order: &[AgentId],
        tick: u64,
        stats: &mut EconomyStats,
    ) -> Result<(), EconomyError> {
        let reserve = self.economy.loan_reserve;
        let threshold = self.economy.loan_need_threshold;
        for &lender in order {
            let Some(agent) = self.roster.get(lender) else {
                continue;
            };
            let mut surplus = agent.sugar.saturating_sub(reserve);
            let position = agent.position;
            if surplus == 0 {
                continue;
            }
            for neighbor in cardinal_neighbors(&self.grid, position) {
                let Some(borrower) = self.roster.occupant(neighbor) else {
                    continue;
                };
                let Some(need) = self
                    .roster
                    .get(borrower)
                    .map(|agent| threshold.saturating_sub(agent.sugar))
                else {
                    continue;
                };
                if need == 0 || self.loans.has_loan_between(lender, borrower) {
                    continue;
                }
                let amount = surplus.min(need);
                self.loans.issue(
                    lender,
                    borrower,
                    amount,
                    self.economy.loan_rate,
                    tick,
                    self.economy.loan_duration,
                )?;
                transfer_sugar(&mut self.roster, lender, borrower, amount)?;
                self.record(
                    Flow::LoanIssue,
                    Resource::Sugar,
                    amount,
                    Holder::Agent(lender),
                    Holder::Agent(borrower),
                )?;
                stats.loans_issued = stats.loans_issued.saturating_add(1);
                surplus = surplus.saturating_sub(amount);
                if surplus == 0 {
                    break;
                }
            }
        }
        Ok(())
    }

    fn immune_update(
        &mut self,
        order: &[AgentId],
        stats: &mut EconomyStats,
    ) -> Result<(), EconomyError> {
        for &id in order {
            if self.roster.get(id).is_none() {
                continue;
            }
            let outcome = immune_response(self.roster.get_mut(id)?);
            stats.cleared = stats.cleared.saturating_add(outcome.cleared);
        }
        Ok(())
    }

    fn death_sweep(&mut self, stats: &mut EconomyStats) -> Result<(), EconomyError> {
        let dying: Vec<(AgentId, DeathCause)> = self
            .roster
            .iter()
            .filter_map(|agent| check_death(agent, &self.economy).map(|cause| (agent.id, cause)))
            .collect();
        for (id, cause) in dying {
            let Some(agent) = self.roster.remove(id) else {
                continue;
            };
            let holder = Holder::Agent(id);
            self.record(Flow::Death, Resource::Sugar, agent.sugar, holder, Holder::Void)?;
            self.record(Flow::Death, Resource::Spice, agent.spice, holder, Holder::Void)?;
            let dropped = self.loans.forget(id);
            stats.deaths = stats.deaths.saturating_add(1);
            debug!(
                agent = %id,
                cause = %cause,
                age = agent.age,
                loans_dropped = dropped,
                "Agent died"
            );
        }
        Ok(())
    }

    fn mature_loans(&mut self, tick: u64, stats: &mut EconomyStats) -> Result<(), EconomyError> {
        for loan_id in self.loans.due(tick) {
            let Some(loan) = self.loans.get(loan_id) else {
                continue;
            };
            let (lender, borrower) = (loan.lender, loan.borrower);
            let available = self
                .roster
                .get(borrower)
                .ok_or(EconomyError::AgentNotFound(borrower))?
                .sugar;
            if self.roster.get(lender).is_none() {
                return Err(EconomyError::AgentNotFound(lender));
            }
            let settlement = self.loans.settle(loan_id, available, tick)?;
            let paid = settlement.paid();
            transfer_sugar(&mut self.roster, borrower, lender, paid)?;
            self.record(
                Flow::Repayment,
                Resource::Sugar,
                paid,
                Holder::Agent(borrower),
                Holder::Agent(lender),
            )?;
            stats.settlements = stats.settlements.saturating_add(1);
            debug!(loan = %loan_id, paid, ?settlement, "Loan settled");
        }
        Ok(())
    }

    /// Mirror occupancy onto the grid through the staged-state commit.
    fn sync_grid(&mut self) -> Result<(), EconomyError> {
        let states: Vec<SugarscapeState> = self
            .grid
            .cells()
            .iter()
            .map(|cell| {
                if self.roster.is_occupied(cell.position()) {
                    SugarscapeState::Agent
                } else {
                    SugarscapeState::Patch
                }
            })
            .collect();
        self.grid.stage_all(states)?;
        self.grid.apply_next_states();
        Ok(())
    }

    fn audit(&self) -> Result<(), EconomyError> {
        if let Some(anomaly) = self.ledger.verify_tick().anomaly() {
            return Err(EconomyError::Imbalance(anomaly.to_string()));
        }
        for resource in [Resource::Sugar, Resource::Spice] {
            if let Some(anomaly) = self.ledger.audit(resource, self.total(resource)).anomaly() {
                return Err(EconomyError::Imbalance(anomaly.to_string()));
            }
        }
        Ok(())
    }

    fn run_phases(&mut self, tick: u64) -> Result<EconomyStats, EconomyError> {
        let mut stats = EconomyStats::default();
        let mut order = self.roster.ids();
        order.shuffle(&mut self.rng);

        self.move_agents(&order, &mut stats)?;
        if StepClock::every(tick, self.economy.growback_interval) {
            self.regrow()?;
        }
        self.reproduce(&order, &mut stats)?;
        if self.economy.spice_enabled {
            self.trade(&order, &mut stats)?;
        }
        self.lend(&order, tick, &mut stats)?;
        self.immune_update(&order, &mut stats)?;
        let grid = &self.grid;
        stats.exposures = transmit(
            &mut self.roster,
            &order,
            |position| cardinal_neighbors(grid, position),
            &mut self.rng,
        )?;
        self.death_sweep(&mut stats)?;
        self.mature_loans(tick, &mut stats)?;
        self.sync_grid()?;
        self.audit()?;
        Ok(stats)
    }
}

fn transfer_sugar(
    roster: &mut AgentRoster,
    from: AgentId,
    to: AgentId,
    amount: u32,
) -> Result<(), EconomyError> {
    if amount == 0 {
        return Ok(());
    }
    let (payer, payee) = roster.pair_mut(from, to)?;
    payer.sugar = payer.sugar.checked_sub(amount).ok_or(EconomyError::Insufficient {
        what: "sugar",
        requested: amount,
        available: payer.sugar,
    })?;
    payee.sugar = payee
        .sugar
        .checked_add(amount)
        .ok_or_else(|| EconomyError::overflow(format!("{to} sugar after transfer")))?;
    Ok(())
}

fn founder_seed<R: Rng + ?Sized>(
    position: Position,
    economy: &EconomyConfig,
    pool: &[Disease],
    rng: &mut R,
) -> AgentSeed {
    let (spice, spice_metabolism) = if economy.spice_enabled {
        (
            rng.random_range(economy.endowment.0..=economy.endowment.1),
            rng.random_range(economy.metabolism.0..=economy.metabolism.1),
        )
    } else {
        (0, 0)
    };
    let diseases = pool
        .iter()
        .filter(|_| economy.infection_prob > 0.0 && rng.random_bool(economy.infection_prob))
        .cloned()
        .collect();
    AgentSeed {
        position: Some(position),
        sugar: i64::from(rng.random_range(economy.endowment.0..=economy.endowment.1)),
        spice: i64::from(spice),
        vision: rng.random_range(economy.vision.0..=economy.vision.1),
        sugar_metabolism: rng.random_range(economy.metabolism.0..=economy.metabolism.1),
        spice_metabolism,
        sex: if rng.random_bool(0.5) {
            Sex::Female
        } else {
            Sex::Male
        },
        fertile_ages: economy.fertile_ages,
        immune: (0..economy.immune_length).map(|_| rng.random_bool(0.5)).collect(),
        diseases,
    }
}

impl Simulation for SugarscapeSimulation {
    type State = SugarscapeState;

    fn kind(&self) -> ModelKind {
        ModelKind::Sugarscape
    }

    fn step(&mut self) -> Result<StepReport, SimulationError> {
        let tick = self.clock.upcoming().ok_or(SimulationError::TickOverflow)?;
        self.ledger.begin_tick(tick);
        let stats = self.run_phases(tick)?;
        self.last_step = stats;
        self.clock.advance()?;

        debug!(
            tick,
            agents = self.roster.len(),
            moved = stats.moved,
            births = stats.births,
            exchanges = stats.exchanges,
            loans = self.loans.len(),
            deaths = stats.deaths,
            "Sugarscape step complete"
        );
        Ok(StepReport {
            tick,
            failed_cells: 0,
            grown: None,
        })
    }

    fn reinitialize(&mut self, config: &SimulationConfig) -> Result<(), SimulationError> {
        *self = Self::new(config)?;
        Ok(())
    }

    fn grid(&self) -> &Grid<SugarscapeState> {
        &self.grid
    }

    fn palette(&self) -> &Palette<SugarscapeState> {
        &self.palette
    }

    fn tick(&self) -> u64 {
        self.clock.tick()
    }
}
