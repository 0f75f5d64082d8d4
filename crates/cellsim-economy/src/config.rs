//! Tunable parameters for the Sugarscape economy.
//!
//! Every value is read from the configuration's `parameters` map under the
//! camel-case names in [`params`]. Missing names fall back to the defaults
//! of [`EconomyConfig::default`]. All problems found are reported together.

use std::collections::BTreeMap;

use cellsim_core::{ConfigError, SimulationConfig};
use rust_decimal::Decimal;

/// Parameter names understood by the economy.
pub mod params {
    /// Agents to scatter when the initial layout places none.
    pub const INITIAL_AGENTS: &str = "initialAgents";
    /// Smallest vision drawn for a founding agent.
    pub const MIN_VISION: &str = "minVision";
    /// Largest vision drawn for a founding agent.
    pub const MAX_VISION: &str = "maxVision";
    /// Smallest metabolism drawn for either resource.
    pub const MIN_METABOLISM: &str = "minMetabolism";
    /// Largest metabolism drawn for either resource.
    pub const MAX_METABOLISM: &str = "maxMetabolism";
    /// Smallest founding endowment of either resource.
    pub const MIN_ENDOWMENT: &str = "minEndowment";
    /// Largest founding endowment of either resource.
    pub const MAX_ENDOWMENT: &str = "maxEndowment";
    /// Peak sugar capacity of the sugar hills.
    pub const MAX_SUGAR_CAPACITY: &str = "maxSugarCapacity";
    /// Peak spice capacity of the spice hills.
    pub const MAX_SPICE_CAPACITY: &str = "maxSpiceCapacity";
    /// Non-zero enables the second resource.
    pub const SPICE: &str = "spice";
    /// Units regrown per growback.
    pub const GROWBACK_RATE: &str = "growbackRate";
    /// Steps between growbacks.
    pub const GROWBACK_INTERVAL: &str = "growbackInterval";
    /// Age at which agents become fertile.
    pub const FERTILE_AGE_MIN: &str = "fertileAgeMin";
    /// Age after which agents are no longer fertile.
    pub const FERTILE_AGE_MAX: &str = "fertileAgeMax";
    /// Age beyond which agents die; zero disables.
    pub const MAX_AGE: &str = "maxAge";
    /// Exchanges one pair may make per step.
    pub const MAX_TRADES_PER_PAIR: &str = "maxTradesPerPair";
    /// Sugar a lender keeps back.
    pub const LOAN_RESERVE: &str = "loanReserve";
    /// Sugar below which an agent asks for a loan.
    pub const LOAN_NEED_THRESHOLD: &str = "loanNeedThreshold";
    /// Interest charged over one loan term.
    pub const LOAN_RATE: &str = "loanRate";
    /// Steps until a loan falls due.
    pub const LOAN_DURATION: &str = "loanDuration";
    /// Distinct diseases in the founding pool.
    pub const DISEASE_COUNT: &str = "diseaseCount";
    /// Bits in each disease genome.
    pub const DISEASE_LENGTH: &str = "diseaseLength";
    /// Bits in each immune system.
    pub const IMMUNE_LENGTH: &str = "immuneLength";
    /// Chance a founding agent carries each pool disease.
    pub const INFECTION_PROB: &str = "infectionProb";
    /// Extra sugar burned per carried disease.
    pub const DISEASE_METABOLISM: &str = "diseaseMetabolism";
}

/// Configuration for the economy, resolved from the parameter map.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomyConfig {
    /// Agents scattered at random when the layout places none (default: 0).
    pub initial_agents: u32,
    /// Vision range for founders, inclusive (default: 1..=6).
    pub vision: (u32, u32),
    /// Metabolism range for founders, inclusive (default: 1..=4).
    pub metabolism: (u32, u32),
    /// Endowment range for founders, inclusive (default: 5..=25).
    pub endowment: (u32, u32),
    /// Peak sugar capacity (default: 4).
    pub max_sugar_capacity: u32,
    /// Peak spice capacity; zero when spice is disabled (default: 4).
    pub max_spice_capacity: u32,
    /// Whether spice exists at all (default: true).
    pub spice_enabled: bool,
    /// Units regrown per growback (default: 1).
    pub growback_rate: u32,
    /// Steps between growbacks; zero never regrows (default: 1).
    pub growback_interval: u64,
    /// Fertility window, inclusive (default: 12..=50).
    pub fertile_ages: (u32, u32),
    /// Maximum age; zero disables old-age death (default: 0).
    pub max_age: u32,
    /// Exchanges per pair per step (default: 10).
    pub max_trades_per_pair: u32,
    /// Sugar a lender keeps back (default: 50).
    pub loan_reserve: u32,
    /// Sugar below which an agent borrows (default: 10).
    pub loan_need_threshold: u32,
    /// Interest over one term (default: 0.1).
    pub loan_rate: Decimal,
    /// Loan term in steps (default: 10).
    pub loan_duration: u64,
    /// Diseases in the founding pool (default: 0).
    pub disease_count: u32,
    /// Bits per disease genome (default: 10).
    pub disease_length: u32,
    /// Bits per immune system (default: 50).
    pub immune_length: u32,
    /// Chance a founder carries each pool disease (default: 0).
    pub infection_prob: f64,
    /// Extra sugar burned per carried disease (default: 1).
    pub disease_metabolism: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_agents: 0,
            vision: (1, 6),
            metabolism: (1, 4),
            endowment: (5, 25),
            max_sugar_capacity: 4,
            max_spice_capacity: 4,
            spice_enabled: true,
            growback_rate: 1,
            growback_interval: 1,
            fertile_ages: (12, 50),
            max_age: 0,
            max_trades_per_pair: 10,
            loan_reserve: 50,
            loan_need_threshold: 10,
            loan_rate: Decimal::new(1, 1),
            loan_duration: 10,
            disease_count: 0,
            disease_length: 10,
            immune_length: 50,
            infection_prob: 0.0,
            disease_metabolism: 1,
        }
    }
}

impl EconomyConfig {
    /// Resolve the economy parameters of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every parameter that is not
    /// a whole number where one is required, and every inconsistent range.
    pub fn from_parameters(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut reader = Reader {
            parameters: &config.parameters,
            problems: Vec::new(),
        };

        let spice_enabled = config.parameter_or(params::SPICE, 1.0) > 0.0;
        let resolved = Self {
            initial_agents: reader.whole(params::INITIAL_AGENTS, defaults.initial_agents),
            vision: (
                reader.whole(params::MIN_VISION, defaults.vision.0),
                reader.whole(params::MAX_VISION, defaults.vision.1),
            ),
            metabolism: (
                reader.whole(params::MIN_METABOLISM, defaults.metabolism.0),
                reader.whole(params::MAX_METABOLISM, defaults.metabolism.1),
            ),
            endowment: (
                reader.whole(params::MIN_ENDOWMENT, defaults.endowment.0),
                reader.whole(params::MAX_ENDOWMENT, defaults.endowment.1),
            ),
            max_sugar_capacity: reader
                .whole(params::MAX_SUGAR_CAPACITY, defaults.max_sugar_capacity),
            max_spice_capacity: if spice_enabled {
                reader.whole(params::MAX_SPICE_CAPACITY, defaults.max_spice_capacity)
            } else {
                0
            },
            spice_enabled,
            growback_rate: reader.whole(params::GROWBACK_RATE, defaults.growback_rate),
            growback_interval: u64::from(reader.whole(params::GROWBACK_INTERVAL, 1)),
            fertile_ages: (
                reader.whole(params::FERTILE_AGE_MIN, defaults.fertile_ages.0),
                reader.whole(params::FERTILE_AGE_MAX, defaults.fertile_ages.1),
            ),
            max_age: reader.whole(params::MAX_AGE, defaults.max_age),
            max_trades_per_pair: reader
                .whole(params::MAX_TRADES_PER_PAIR, defaults.max_trades_per_pair),
            loan_reserve: reader.whole(params::LOAN_RESERVE, defaults.loan_reserve),
            loan_need_threshold: reader
                .whole(params::LOAN_NEED_THRESHOLD, defaults.loan_need_threshold),
            loan_rate: reader.decimal(params::LOAN_RATE, defaults.loan_rate),
            loan_duration: u64::from(reader.whole(params::LOAN_DURATION, 10)),
            disease_count: reader.whole(params::DISEASE_COUNT, defaults.disease_count),
            disease_length: reader.whole(params::DISEASE_LENGTH, defaults.disease_length),
            immune_length: reader.whole(params::IMMUNE_LENGTH, defaults.immune_length),
            infection_prob: config.parameter_or(params::INFECTION_PROB, defaults.infection_prob),
            disease_metabolism: reader
                .whole(params::DISEASE_METABOLISM, defaults.disease_metabolism),
        };

        let mut problems = reader.problems;
        resolved.check_ranges(&mut problems);
        if problems.is_empty() {
            Ok(resolved)
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }

    fn check_ranges(&self, problems: &mut Vec<String>) {
        for (what, (low, high)) in [
            ("vision", self.vision),
            ("metabolism", self.metabolism),
            ("endowment", self.endowment),
            ("fertile age", self.fertile_ages),
        ] {
            if low > high {
                problems.push(format!("{what} range is empty: {low} > {high}"));
            }
        }
        if self.vision.0 == 0 {
            problems.push("minVision must be at least 1".to_owned());
        }
        if self.endowment.0 == 0 {
            problems.push("minEndowment must be at least 1".to_owned());
        }
        if self.fertile_ages.0 == 0 {
            problems.push("fertileAgeMin must be at least 1".to_owned());
        }
        if self.disease_count > 0 {
            if self.disease_length == 0 {
                problems.push("diseaseLength must be at least 1".to_owned());
            }
            if self.immune_length < self.disease_length {
                problems.push(format!(
                    "immuneLength {} is shorter than diseaseLength {}",
                    self.immune_length, self.disease_length
                ));
            }
        }
    }
}

struct Reader<'a> {
    parameters: &'a BTreeMap<String, f64>,
    problems: Vec<String>,
}

impl Reader<'_> {
    fn whole(&mut self, name: &str, default: u32) -> u32 {
        let Some(&value) = self.parameters.get(name) else {
            return default;
        };
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)
        {
            // Range and integrality checked above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = value as u32;
            whole
        } else {
            self.problems
                .push(format!("parameter {name} must be a whole number, got {value}"));
            default
        }
    }

    fn decimal(&mut self, name: &str, default: Decimal) -> Decimal {
        let Some(&value) = self.parameters.get(name) else {
            return default;
        };
        match Decimal::try_from(value) {
            Ok(decimal) if decimal >= Decimal::ZERO => decimal.round_dp(8),
            _ => {
                self.problems
                    .push(format!("parameter {name} must be a non-negative decimal, got {value}"));
                default
            }
        }
    }
}
