//! Bilateral sugar-for-spice trade.
//!
//! An agent's marginal rate of substitution is
//! `(spice / spice_metabolism) / (sugar / sugar_metabolism)`: how much spice
//! it would give for one unit of sugar. When two neighbors' rates differ,
//! the one with the higher rate buys sugar from the other, paying in spice
//! at the geometric mean of the two rates. Exchanges repeat while both
//! welfares strictly improve and the rates do not cross, up to a per-pair
//! limit.

use cellsim_types::AgentId;

use crate::agent::Agent;

const RATE_EPSILON: f64 = 1e-9;

/// Marginal rate of substitution of spice for sugar.
///
/// `None` when a holding or a metabolism is zero.
pub fn mrs(agent: &Agent) -> Option<f64> {
    rate(
        agent.sugar,
        agent.spice,
        agent.sugar_metabolism,
        agent.spice_metabolism,
    )
}

fn rate(sugar: u32, spice: u32, sugar_met: u32, spice_met: u32) -> Option<f64> {
    if sugar == 0 || spice == 0 || sugar_met == 0 || spice_met == 0 {
        return None;
    }
    let sugar_time = f64::from(sugar) / f64::from(sugar_met);
    let spice_time = f64::from(spice) / f64::from(spice_met);
    Some(spice_time / sugar_time)
}

/// Cobb-Douglas welfare of holding `sugar` and `spice`.
pub fn welfare(sugar: u32, spice: u32, sugar_met: u32, spice_met: u32) -> f64 {
    let total = f64::from(sugar_met) + f64::from(spice_met);
    if total <= 0.0 {
        return 0.0;
    }
    f64::from(sugar).powf(f64::from(sugar_met) / total)
        * f64::from(spice).powf(f64::from(spice_met) / total)
}

/// One completed exchange: `sugar` moved from `seller` to `buyer` and
/// `spice` moved back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    /// Agent giving sugar and receiving spice.
    pub seller: AgentId,
    /// Agent giving spice and receiving sugar.
    pub buyer: AgentId,
    /// Sugar units moved.
    pub sugar: u32,
    /// Spice units moved.
    pub spice: u32,
}

/// Round a positive quantity to whole units; `None` if it does not fit.
fn units(quantity: f64) -> Option<u32> {
    let rounded = quantity.round();
    if rounded.is_finite() && rounded >= 1.0 && rounded <= f64::from(u32::MAX) {
        // Range checked above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = rounded as u32;
        Some(whole)
    } else {
        None
    }
}

/// Trade between `first` and `second` until no exchange helps both or
/// `max_trades` exchanges have happened. Returns the exchanges made.
pub fn trade_pair(first: &mut Agent, second: &mut Agent, max_trades: u32) -> Vec<Exchange> {
    let mut exchanges = Vec::new();
    for _ in 0..max_trades {
        let (Some(rate_first), Some(rate_second)) = (mrs(first), mrs(second)) else {
            break;
        };
        if (rate_first - rate_second).abs() < RATE_EPSILON {
            break;
        }
        let (buyer, seller, buyer_rate, seller_rate) = if rate_first > rate_second {
            (&mut *first, &mut *second, rate_first, rate_second)
        } else {
            (&mut *second, &mut *first, rate_second, rate_first)
        };
        let price = (buyer_rate * seller_rate).sqrt();
        let quantities = if price >= 1.0 {
            units(price).map(|spice| (1, spice))
        } else {
            units(price.recip()).map(|sugar| (sugar, 1))
        };
        let Some((sugar, spice)) = quantities else {
            break;
        };
        let Some(exchange) = try_exchange(buyer, seller, sugar, spice) else {
            break;
        };
        exchanges.push(exchange);
    }
    exchanges
}

fn try_exchange(buyer: &mut Agent, seller: &mut Agent, sugar: u32, spice: u32) -> Option<Exchange> {
    let seller_sugar = seller.sugar.checked_sub(sugar)?;
    let seller_spice = seller.spice.checked_add(spice)?;
    let buyer_sugar = buyer.sugar.checked_add(sugar)?;
    let buyer_spice = buyer.spice.checked_sub(spice)?;

    let improves = |agent: &Agent, new_sugar: u32, new_spice: u32| {
        welfare(new_sugar, new_spice, agent.sugar_metabolism, agent.spice_metabolism)
            > welfare(agent.sugar, agent.spice, agent.sugar_metabolism, agent.spice_metabolism)
    };
    if !improves(buyer, buyer_sugar, buyer_spice) || !improves(seller, seller_sugar, seller_spice) {
        return None;
    }

    let buyer_after = rate(
        buyer_sugar,
        buyer_spice,
        buyer.sugar_metabolism,
        buyer.spice_metabolism,
    )?;
    let seller_after = rate(
        seller_sugar,
        seller_spice,
        seller.sugar_metabolism,
        seller.spice_metabolism,
    )?;
    if buyer_after < seller_after {
        return None;
    }

    buyer.sugar = buyer_sugar;
    buyer.spice = buyer_spice;
    seller.sugar = seller_sugar;
    seller.spice = seller_spice;
    Some(Exchange {
        seller: seller.id,
        buyer: buyer.id,
        sugar,
        spice,
    })
}

#[cfg(test)]
mod tests {
    use cellsim_types::{Position, Sex};

    use super::*;
    use crate::agent::AgentSeed;

    fn agent(id: u64, sugar: i64, spice: i64) -> Agent {
        AgentSeed {
            position: Some(Position::new(0, 0)),
            sugar,
            spice,
            vision: 1,
            sugar_metabolism: 1,
            spice_metabolism: 1,
            sex: Sex::Female,
            fertile_ages: (1, 10),
            immune: Vec::new(),
            diseases: Vec::new(),
        }
        .build(AgentId(id), 1, 1)
        .unwrap()
    }

    #[test]
    fn rate_reflects_relative_scarcity() {
        let rich_in_spice = agent(0, 2, 20);
        let rich_in_sugar = agent(1, 20, 2);
        assert!(mrs(&rich_in_spice).unwrap() > 1.0);
        assert!(mrs(&rich_in_sugar).unwrap() < 1.0);
        assert_eq!(mrs(&agent(2, 0, 5)), None);
    }

    #[test]
    fn complementary_agents_trade_toward_balance() {
        let mut first = agent(0, 2, 20);
        let mut second = agent(1, 20, 2);
        let welfare_before = (
            welfare(first.sugar, first.spice, 1, 1),
            welfare(second.sugar, second.spice, 1, 1),
        );
        let exchanges = trade_pair(&mut first, &mut second, 10);
        assert!(!exchanges.is_empty());
        assert!(exchanges.iter().all(|e| e.buyer == AgentId(0)));

        // Nothing is created or destroyed.
        assert_eq!(first.sugar + second.sugar, 22);
        assert_eq!(first.spice + second.spice, 22);
        assert!(welfare(first.sugar, first.spice, 1, 1) > welfare_before.0);
        assert!(welfare(second.sugar, second.spice, 1, 1) > welfare_before.1);
        // Rates did not cross.
        assert!(mrs(&first).unwrap() >= mrs(&second).unwrap());
    }

    #[test]
    fn equal_rates_do_not_trade() {
        let mut first = agent(0, 10, 10);
        let mut second = agent(1, 4, 4);
        assert!(trade_pair(&mut first, &mut second, 10).is_empty());
    }

    #[test]
    fn trade_limit_respected() {
        let mut first = agent(0, 1, 100);
        let mut second = agent(1, 100, 1);
        assert_eq!(trade_pair(&mut first, &mut second, 1).len(), 1);
    }
}
