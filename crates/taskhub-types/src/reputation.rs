//! Agent reputation records
//!
//! One [`AgentReputation`] per agent, independent of any single task.
//! The composite score combines success rate, a rolling rating average, and
//! a saturating experience bonus on a 0-100 scale. The 50/40/10 weighting
//! and the floor-division saturation are load-bearing constants: existing
//! trust thresholds (default 60) are calibrated against them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::AgentId;

/// Rolling rating window capacity; oldest rating is evicted first.
pub const RATING_WINDOW: usize = 10;

/// Ratings are on a 0-5 scale.
pub const MAX_RATING: Decimal = dec!(5);

/// Neutral-favorable prior for agents with no history.
const DEFAULT_RATING: Decimal = dec!(4);

/// Cumulative trust record for one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReputation {
    /// Agent this record belongs to
    pub agent: AgentId,
    /// Total settled tasks (completed + failed)
    pub total_tasks: u64,
    /// Successfully completed tasks
    pub completed_tasks: u64,
    /// Failed tasks
    pub failed_tasks: u64,
    /// Most recent ratings, seeded at the default so new agents start
    /// mid-scale rather than at zero
    pub recent_ratings: VecDeque<Decimal>,
    /// Arithmetic mean of `recent_ratings`
    pub avg_rating: Decimal,
    /// Cumulative earnings credited at settlement
    pub total_earnings: Decimal,
    /// First-seen timestamp
    pub joined_at: DateTime<Utc>,
}

impl AgentReputation {
    pub fn new(agent: AgentId) -> Self {
        Self {
            agent,
            total_tasks: 0,
            completed_tasks: 0,
            failed_tasks: 0,
            recent_ratings: std::iter::repeat(DEFAULT_RATING).take(RATING_WINDOW).collect(),
            avg_rating: DEFAULT_RATING,
            total_earnings: Decimal::ZERO,
            joined_at: Utc::now(),
        }
    }

    /// Completed/total ratio. Defaults to 1.0 for unseen agents: an
    /// optimistic prior so new agents are not trust-gated out of the market.
    pub fn success_rate(&self) -> Decimal {
        if self.total_tasks == 0 {
            return Decimal::ONE;
        }
        Decimal::from(self.completed_tasks) / Decimal::from(self.total_tasks)
    }

    /// Composite reputation score on [0, 100]:
    /// `success_rate * 50 + (avg_rating / 5) * 40 + min(10, completed / 10)`
    ///
    /// The experience bonus is one point per ten completed tasks and
    /// saturates at 10 after 100 completions.
    pub fn reputation_score(&self) -> Decimal {
        let success_component = self.success_rate() * dec!(50);
        let rating_component = (self.avg_rating / MAX_RATING) * dec!(40);
        let exp_component = Decimal::from((self.completed_tasks / 10).min(10));

        (success_component + rating_component + exp_component).min(dec!(100))
    }

    /// Record a settled task, with an optional rating from the buyer.
    pub fn record_result(&mut self, completed: bool, rating: Option<Decimal>) {
        self.total_tasks += 1;
        if completed {
            self.completed_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }

        if let Some(rating) = rating {
            self.recent_ratings.push_back(rating);
            while self.recent_ratings.len() > RATING_WINDOW {
                self.recent_ratings.pop_front();
            }
            let sum: Decimal = self.recent_ratings.iter().copied().sum();
            self.avg_rating = sum / Decimal::from(self.recent_ratings.len() as u64);
        }
    }

    /// Credit earnings paid out of escrow.
    pub fn credit_earnings(&mut self, amount: Decimal) {
        self.total_earnings += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep() -> AgentReputation {
        AgentReputation::new(AgentId::new("solver_test"))
    }

    #[test]
    fn test_new_agent_prior() {
        let rep = rep();
        assert_eq!(rep.success_rate(), Decimal::ONE);
        assert_eq!(rep.avg_rating, dec!(4));
        // 1.0 * 50 + (4/5) * 40 + 0 = 82
        assert_eq!(rep.reputation_score(), dec!(82));
    }

    #[test]
    fn test_score_worked_example() {
        let mut rep = rep();
        rep.total_tasks = 15;
        rep.completed_tasks = 12;
        rep.failed_tasks = 3;
        rep.avg_rating = dec!(4.5);
        // (12/15)*50 + (4.5/5)*40 + min(10, 12/10) = 40 + 36 + 1 = 77
        assert_eq!(rep.reputation_score(), dec!(77));
    }

    #[test]
    fn test_score_bounded_and_saturating() {
        let mut rep = rep();
        rep.total_tasks = 5000;
        rep.completed_tasks = 5000;
        rep.avg_rating = dec!(5);
        // 50 + 40 + 10, bonus saturated well past 100 completions
        assert_eq!(rep.reputation_score(), dec!(100));

        rep.completed_tasks = 100;
        rep.total_tasks = 100;
        assert_eq!(rep.reputation_score(), dec!(100));
    }

    #[test]
    fn test_score_floor() {
        let mut rep = rep();
        rep.total_tasks = 10;
        rep.completed_tasks = 0;
        rep.failed_tasks = 10;
        rep.avg_rating = Decimal::ZERO;
        assert_eq!(rep.reputation_score(), Decimal::ZERO);
    }

    #[test]
    fn test_rating_window_eviction() {
        let mut rep = rep();
        for _ in 0..10 {
            rep.record_result(true, Some(dec!(5)));
        }
        // Window is now entirely 5.0 entries; the seeded 4.0s are gone.
        assert_eq!(rep.recent_ratings.len(), RATING_WINDOW);
        assert_eq!(rep.avg_rating, dec!(5));
    }

    #[test]
    fn test_single_rating_shifts_average() {
        let mut rep = rep();
        rep.record_result(true, Some(dec!(5)));
        // (9 * 4.0 + 5.0) / 10
        assert_eq!(rep.avg_rating, dec!(4.1));
    }

    #[test]
    fn test_unrated_settlement_keeps_average() {
        let mut rep = rep();
        rep.record_result(false, None);
        assert_eq!(rep.total_tasks, 1);
        assert_eq!(rep.failed_tasks, 1);
        assert_eq!(rep.avg_rating, dec!(4));
    }

    #[test]
    fn test_score_monotone_in_success_rate() {
        let mut low = rep();
        low.total_tasks = 10;
        low.completed_tasks = 5;
        let mut high = rep();
        high.total_tasks = 10;
        high.completed_tasks = 9;
        assert!(high.reputation_score() > low.reputation_score());
    }
}
