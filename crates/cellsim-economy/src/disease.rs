//! Diseases, immune response, and transmission.
//!
//! A [`Disease`] is an immutable bit-string genome. Each step an agent's
//! immune system moves one bit closer to every disease it carries: the
//! window of the immune string with the smallest Hamming distance to the
//! genome (the first such window on ties) has its first mismatching bit
//! flipped. A disease whose genome appears verbatim in the immune string
//! is cleared. Every carried disease adds to the carrier's sugar burn.

use cellsim_types::{AgentId, DiseaseId, Position};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::agent::{Agent, AgentRoster};
use crate::error::EconomyError;

/// An immutable disease genome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disease {
    /// Identity shared by every copy of this disease.
    pub id: DiseaseId,
    /// Genome bits.
    pub genome: Vec<bool>,
}

impl Disease {
    /// Generate a disease with a random genome of `length` bits.
    pub fn random<R: Rng + ?Sized>(id: DiseaseId, length: u32, rng: &mut R) -> Self {
        Self {
            id,
            genome: (0..length).map(|_| rng.random_bool(0.5)).collect(),
        }
    }

    /// Whether the genome appears verbatim in `immune`.
    pub fn is_recognized_by(&self, immune: &[bool]) -> bool {
        closest_window(immune, &self.genome).is_some_and(|(_, distance)| distance == 0)
    }
}

/// Offset and Hamming distance of the window of `immune` closest to
/// `genome`. Ties go to the earliest window. `None` when the genome is
/// empty or longer than the immune string.
pub fn closest_window(immune: &[bool], genome: &[bool]) -> Option<(usize, usize)> {
    if genome.is_empty() {
        return None;
    }
    immune
        .windows(genome.len())
        .enumerate()
        .map(|(offset, window)| {
            let distance = window
                .iter()
                .zip(genome)
                .filter(|(have, want)| have != want)
                .count();
            (offset, distance)
        })
        .min_by_key(|&(offset, distance)| (distance, offset))
}

/// What one immune update did to an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImmuneOutcome {
    /// Immune bits flipped.
    pub flipped: usize,
    /// Diseases cleared.
    pub cleared: usize,
}

/// Run one immune update for `agent`.
pub fn immune_response(agent: &mut Agent) -> ImmuneOutcome {
    let mut outcome = ImmuneOutcome::default();
    for disease in &agent.diseases {
        let Some((offset, distance)) = closest_window(&agent.immune, &disease.genome) else {
            continue;
        };
        if distance == 0 {
            continue;
        }
        let mismatch = agent
            .immune
            .iter()
            .skip(offset)
            .zip(&disease.genome)
            .position(|(have, want)| have != want);
        let target = mismatch.and_then(|index| offset.checked_add(index));
        if let Some(bit) = target.and_then(|index| agent.immune.get_mut(index)) {
            *bit = !*bit;
            outcome.flipped = outcome.flipped.saturating_add(1);
        }
    }
    let before = agent.diseases.len();
    let immune = &agent.immune;
    agent
        .diseases
        .retain(|disease| !disease.is_recognized_by(immune));
    outcome.cleared = before.saturating_sub(agent.diseases.len());
    outcome
}

/// Each infected agent in `order` exposes one random neighbor to a copy of
/// one of its diseases. Exposures are chosen from the carriers' diseases at
/// the start of the phase, so a disease spreads at most one hop per step.
///
/// `neighbors` lists the cells adjacent to a position. Returns the number
/// of exposures.
///
/// # Errors
///
/// Returns [`EconomyError::AgentNotFound`] if a chosen neighbor vanished.
pub fn transmit<R, F>(
    roster: &mut AgentRoster,
    order: &[AgentId],
    neighbors: F,
    rng: &mut R,
) -> Result<usize, EconomyError>
where
    R: Rng + ?Sized,
    F: Fn(Position) -> Vec<Position>,
{
    let mut exposures: Vec<(AgentId, Disease)> = Vec::new();
    for &id in order {
        let Some(carrier) = roster.get(id) else {
            continue;
        };
        if carrier.diseases.is_empty() {
            continue;
        }
        let targets: Vec<AgentId> = neighbors(carrier.position)
            .into_iter()
            .filter_map(|position| roster.occupant(position))
            .collect();
        let (Some(&target), Some(disease)) =
            (targets.choose(rng), carrier.diseases.choose(rng))
        else {
            continue;
        };
        exposures.push((target, disease.clone()));
    }

    let count = exposures.len();
    for (target, disease) in exposures {
        roster.get_mut(target)?.diseases.push(disease);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use cellsim_types::Sex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::agent::AgentSeed;

    fn bits(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == '1').collect()
    }

    fn disease(pattern: &str) -> Disease {
        Disease {
            id: DiseaseId(0),
            genome: bits(pattern),
        }
    }

    fn carrier(immune: &str, diseases: Vec<Disease>) -> Agent {
        AgentSeed {
            position: Some(Position::new(0, 0)),
            sugar: 5,
            spice: 5,
            vision: 1,
            sugar_metabolism: 1,
            spice_metabolism: 1,
            sex: Sex::Male,
            fertile_ages: (1, 10),
            immune: bits(immune),
            diseases,
        }
        .build(AgentId(0), 3, 3)
        .unwrap()
    }

    #[test]
    fn closest_window_prefers_earliest_on_ties() {
        let immune = bits("0110110");
        assert_eq!(closest_window(&immune, &bits("11")), Some((1, 0)));
        assert_eq!(closest_window(&immune, &bits("000")), Some((0, 2)));
        assert_eq!(closest_window(&immune, &bits("00000000")), None);
    }

    #[test]
    fn immune_response_flips_first_mismatch() {
        let mut agent = carrier("0000", vec![disease("101")]);
        let outcome = immune_response(&mut agent);
        assert_eq!(outcome.flipped, 1);
        assert_eq!(agent.immune, bits("1000"));
        assert_eq!(agent.diseases.len(), 1);

        let outcome = immune_response(&mut agent);
        assert_eq!(agent.immune, bits("1010"));
        assert_eq!(outcome.cleared, 1);
        assert!(agent.diseases.is_empty());
    }

    #[test]
    fn recognized_disease_cleared_without_flipping() {
        let mut agent = carrier("0110", vec![disease("11"), disease("11")]);
        let outcome = immune_response(&mut agent);
        assert_eq!(outcome.flipped, 0);
        assert_eq!(outcome.cleared, 2);
    }

    #[test]
    fn transmission_reaches_a_neighbor() {
        let mut roster = AgentRoster::new();
        let mut sick = AgentSeed {
            position: Some(Position::new(1, 1)),
            sugar: 5,
            spice: 5,
            vision: 1,
            sugar_metabolism: 1,
            spice_metabolism: 1,
            sex: Sex::Male,
            fertile_ages: (1, 10),
            immune: bits("0000"),
            diseases: vec![disease("11")],
        };
        let first = roster.spawn(sick.clone(), 3, 3).unwrap();
        sick.position = Some(Position::new(1, 2));
        sick.diseases.clear();
        let second = roster.spawn(sick, 3, 3).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let neighbors = |p: Position| vec![Position::new(p.row, p.col.saturating_add(1))];
        let exposures = transmit(&mut roster, &[first, second], neighbors, &mut rng).unwrap();
        assert_eq!(exposures, 1);
        assert_eq!(roster.get(second).unwrap().diseases.len(), 1);
    }
}
