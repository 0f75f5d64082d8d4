//! Sexual reproduction.
//!
//! Two neighbors mate when they are of opposite sex, both inside their
//! fertility windows, and both hold at least their own starting endowment.
//! Each parent donates half of its starting endowment to the child, so the
//! child starts with the average of its parents' endowments. Vision and
//! metabolism are the parents' averages; each immune bit comes from one
//! parent chosen at random. Children start at age zero and so are not yet
//! fertile.

use cellsim_types::{Position, Sex};
use rand::Rng;

use crate::agent::{Agent, AgentSeed};

/// Sugar and spice one parent gives a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Donation {
    /// Sugar given.
    pub sugar: u32,
    /// Spice given.
    pub spice: u32,
}

/// Half of `parent`'s starting endowment.
pub fn donation(parent: &Agent) -> Donation {
    Donation {
        sugar: parent.initial_sugar.checked_div(2).unwrap_or(0),
        spice: parent.initial_spice.checked_div(2).unwrap_or(0),
    }
}

/// Whether `a` and `b` may mate.
pub fn can_mate(a: &Agent, b: &Agent) -> bool {
    a.sex == b.sex.opposite()
        && a.is_fertile_age()
        && b.is_fertile_age()
        && a.can_endow()
        && b.can_endow()
}

fn average(a: u32, b: u32) -> u32 {
    let sum = u64::from(a).saturating_add(u64::from(b));
    u32::try_from(sum.checked_div(2).unwrap_or(0)).unwrap_or(u32::MAX)
}

/// Describe the child of `a` and `b` born at `position`.
///
/// The returned seed's endowment is the sum of both parents' donations.
pub fn child_seed<R: Rng + ?Sized>(
    a: &Agent,
    b: &Agent,
    position: Position,
    fertile_ages: (u32, u32),
    rng: &mut R,
) -> AgentSeed {
    let (from_a, from_b) = (donation(a), donation(b));
    let immune = a
        .immune
        .iter()
        .zip(&b.immune)
        .map(|(&bit_a, &bit_b)| if rng.random_bool(0.5) { bit_a } else { bit_b })
        .collect();
    AgentSeed {
        position: Some(position),
        sugar: i64::from(from_a.sugar).saturating_add(i64::from(from_b.sugar)),
        spice: i64::from(from_a.spice).saturating_add(i64::from(from_b.spice)),
        vision: average(a.vision, b.vision),
        sugar_metabolism: average(a.sugar_metabolism, b.sugar_metabolism),
        spice_metabolism: average(a.spice_metabolism, b.spice_metabolism),
        sex: if rng.random_bool(0.5) {
            Sex::Female
        } else {
            Sex::Male
        },
        fertile_ages,
        immune,
        diseases: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use cellsim_types::AgentId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn parent(id: u64, sex: Sex, endowment: i64, immune: Vec<bool>) -> Agent {
        let mut agent = AgentSeed {
            position: Some(Position::new(0, 0)),
            sugar: endowment,
            spice: endowment,
            vision: 2 + u32::try_from(id).unwrap(),
            sugar_metabolism: 2,
            spice_metabolism: 3,
            sex,
            fertile_ages: (1, 30),
            immune,
            diseases: Vec::new(),
        }
        .build(AgentId(id), 1, 1)
        .unwrap();
        agent.age = 5;
        agent
    }

    #[test]
    fn opposite_fertile_wealthy_pairs_mate() {
        let mother = parent(0, Sex::Female, 10, Vec::new());
        let father = parent(1, Sex::Male, 20, Vec::new());
        assert!(can_mate(&mother, &father));

        let sister = parent(2, Sex::Female, 10, Vec::new());
        assert!(!can_mate(&mother, &sister));

        let mut young = parent(3, Sex::Male, 10, Vec::new());
        young.age = 0;
        assert!(!can_mate(&mother, &young));

        let mut poor = parent(4, Sex::Male, 10, Vec::new());
        poor.sugar = 9;
        assert!(!can_mate(&mother, &poor));
    }

    #[test]
    fn child_endowment_is_sum_of_half_endowments() {
        let mother = parent(0, Sex::Female, 10, vec![true, true, true]);
        let father = parent(1, Sex::Male, 21, vec![false, false, false]);
        let mut rng = StdRng::seed_from_u64(9);
        let seed = child_seed(&mother, &father, Position::new(0, 0), (12, 40), &mut rng);
        assert_eq!(seed.sugar, 5 + 10);
        assert_eq!(seed.spice, 5 + 10);
        assert_eq!(seed.vision, 2);
        assert_eq!(seed.sugar_metabolism, 2);
        assert_eq!(seed.immune.len(), 3);
        assert_eq!(seed.fertile_ages, (12, 40));

        let child = seed.build(AgentId(2), 1, 1).unwrap();
        assert_eq!(child.age, 0);
        assert!(!child.is_fertile_age());
    }
}
