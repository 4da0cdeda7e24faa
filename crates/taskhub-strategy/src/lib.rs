//! Taskhub Strategy - Pure Bidding Policies
//!
//! A strategy is a pure function from (cost basis, market snapshot, budget
//! ceiling) to a proposed bid price. Strategies never fail and hold no
//! state, so they are modeled as a closed enum rather than trait objects.
//! Callers apply the over-budget check separately; apart from the two
//! explicitly capped policies, a strategy may legally propose a price above
//! budget (the market excludes it at selection time).
//!
//! The multipliers are behavioral constants. Agents in the wild have tuned
//! against them, so changing any of them is a compatibility break.

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use taskhub_types::MarketSnapshot;

/// A pure bidding policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Low-ball to win: cost * 1.05, capped at 99% of budget. Suited to
    /// new agents that need to accumulate reputation.
    Aggressive,
    /// High margin: cost * 1.50, capped at 99% of budget.
    Conservative,
    /// Undercut the observed average slightly; fall back to cost * 1.10
    /// when the market trades below cost.
    MarketFollow,
    /// Price by competition intensity: high margin when few bids, thin
    /// margin when crowded.
    Sniper,
    /// Uniform jitter around cost, no intelligence. The only
    /// non-deterministic policy.
    RandomWalk,
}

impl Strategy {
    /// Compute a bid price from the cost basis and observed market state.
    pub fn calculate_bid(
        &self,
        cost: Decimal,
        snapshot: &MarketSnapshot,
        max_budget: Decimal,
    ) -> Decimal {
        match self {
            Strategy::Aggressive => (cost * dec!(1.05)).min(max_budget * dec!(0.99)),
            Strategy::Conservative => (cost * dec!(1.50)).min(max_budget * dec!(0.99)),
            Strategy::MarketFollow => {
                if snapshot.avg_price < cost {
                    cost * dec!(1.10)
                } else {
                    snapshot.avg_price * dec!(0.98)
                }
            }
            Strategy::Sniper => {
                if snapshot.total_bids < 3 {
                    cost * dec!(1.40)
                } else if snapshot.total_bids < 10 {
                    cost * dec!(1.15)
                } else {
                    cost * dec!(1.02)
                }
            }
            Strategy::RandomWalk => {
                // uniform(0.9, 1.1) sampled in thousandths to stay in
                // exact decimal arithmetic
                let variance = Decimal::from(rand::thread_rng().gen_range(900u32..=1100));
                cost * variance / dec!(1000)
            }
        }
    }

    /// Stable strategy name, usable as a declared bid label.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Aggressive => "aggressive",
            Strategy::Conservative => "conservative",
            Strategy::MarketFollow => "market_follow",
            Strategy::Sniper => "sniper",
            Strategy::RandomWalk => "random",
        }
    }

    /// Look up a strategy by name; unknown names fall back to
    /// [`Strategy::Aggressive`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "conservative" => Strategy::Conservative,
            "market_follow" => Strategy::MarketFollow,
            "sniper" => Strategy::Sniper,
            "random" => Strategy::RandomWalk,
            _ => Strategy::Aggressive,
        }
    }

    /// Every strategy, in a stable order.
    pub fn all() -> [Strategy; 5] {
        [
            Strategy::Aggressive,
            Strategy::Conservative,
            Strategy::MarketFollow,
            Strategy::Sniper,
            Strategy::RandomWalk,
        ]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(avg: Decimal, bids: usize) -> MarketSnapshot {
        MarketSnapshot {
            avg_price: avg,
            min_price: avg,
            max_price: avg,
            total_bids: bids,
            task_complexity: dec!(0.5),
        }
    }

    #[test]
    fn test_aggressive_markup() {
        let s = snapshot(dec!(0), 0);
        let bid = Strategy::Aggressive.calculate_bid(dec!(1.0), &s, dec!(10));
        assert_eq!(bid, dec!(1.05));
    }

    #[test]
    fn test_aggressive_budget_cap() {
        let s = snapshot(dec!(0), 0);
        let bid = Strategy::Aggressive.calculate_bid(dec!(100), &s, dec!(1.0));
        assert_eq!(bid, dec!(0.99));
    }

    #[test]
    fn test_conservative_markup_and_cap() {
        let s = snapshot(dec!(0), 0);
        assert_eq!(
            Strategy::Conservative.calculate_bid(dec!(2.0), &s, dec!(10)),
            dec!(3.0)
        );
        assert_eq!(
            Strategy::Conservative.calculate_bid(dec!(2.0), &s, dec!(2.0)),
            dec!(1.98)
        );
    }

    #[test]
    fn test_market_follow_undercuts_average() {
        let s = snapshot(dec!(2.0), 4);
        let bid = Strategy::MarketFollow.calculate_bid(dec!(1.0), &s, dec!(10));
        assert_eq!(bid, dec!(1.96));
    }

    #[test]
    fn test_market_follow_below_cost_market() {
        // Market average under cost: quote a thin markup over cost instead.
        let s = snapshot(dec!(0.5), 4);
        let bid = Strategy::MarketFollow.calculate_bid(dec!(1.0), &s, dec!(10));
        assert_eq!(bid, dec!(1.10));
    }

    #[test]
    fn test_sniper_tiers() {
        let cost = dec!(1.0);
        let budget = dec!(100);
        assert_eq!(
            Strategy::Sniper.calculate_bid(cost, &snapshot(dec!(1), 0), budget),
            dec!(1.40)
        );
        assert_eq!(
            Strategy::Sniper.calculate_bid(cost, &snapshot(dec!(1), 2), budget),
            dec!(1.40)
        );
        assert_eq!(
            Strategy::Sniper.calculate_bid(cost, &snapshot(dec!(1), 3), budget),
            dec!(1.15)
        );
        assert_eq!(
            Strategy::Sniper.calculate_bid(cost, &snapshot(dec!(1), 9), budget),
            dec!(1.15)
        );
        assert_eq!(
            Strategy::Sniper.calculate_bid(cost, &snapshot(dec!(1), 10), budget),
            dec!(1.02)
        );
    }

    #[test]
    fn test_random_walk_bounded() {
        let s = snapshot(dec!(1), 0);
        let cost = dec!(2.0);
        for _ in 0..100 {
            let bid = Strategy::RandomWalk.calculate_bid(cost, &s, dec!(100));
            assert!(bid >= dec!(1.8), "bid {bid} under 0.9x cost");
            assert!(bid <= dec!(2.2), "bid {bid} over 1.1x cost");
        }
    }

    #[test]
    fn test_name_round_trip() {
        for strategy in Strategy::all() {
            assert_eq!(Strategy::from_name(strategy.name()), strategy);
        }
        // Unknown labels fall back to aggressive.
        assert_eq!(Strategy::from_name("galaxy_brain"), Strategy::Aggressive);
    }
}
