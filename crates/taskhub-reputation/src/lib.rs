//! Taskhub Reputation - Per-Agent Trust Ledger
//!
//! Tracks historical performance for every agent that has ever settled a
//! task: success/failure tallies, a rolling rating window, and cumulative
//! earnings. Records are created lazily on first reference with a
//! neutral-favorable prior, so unseen agents are not excluded from
//! trust-gated matching.
//!
//! Purely in-memory aggregation; no operation here can fail. Concurrent
//! updates to the same record are serialized behind one write lock.

use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info};

use taskhub_types::{AgentId, AgentReputation};

/// Suggested minimum score for trust-gated matching.
pub const DEFAULT_TRUST_THRESHOLD: Decimal = rust_decimal_macros::dec!(60);

/// In-memory reputation ledger, one record per agent
pub struct ReputationLedger {
    records: RwLock<HashMap<AgentId, AgentReputation>>,
}

impl ReputationLedger {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of an agent's record, creating it with the default prior if
    /// this agent has never been seen. Never fails.
    pub fn get_or_create(&self, agent: &AgentId) -> AgentReputation {
        let mut records = self.records.write();
        records
            .entry(agent.clone())
            .or_insert_with(|| {
                debug!(%agent, "created reputation record");
                AgentReputation::new(agent.clone())
            })
            .clone()
    }

    /// Record a settled task for an agent, with an optional 0-5 rating.
    pub fn update(&self, agent: &AgentId, completed: bool, rating: Option<Decimal>) {
        let mut records = self.records.write();
        let record = records
            .entry(agent.clone())
            .or_insert_with(|| AgentReputation::new(agent.clone()));
        record.record_result(completed, rating);

        info!(
            %agent,
            total = record.total_tasks,
            success_rate = %record.success_rate(),
            avg_rating = %record.avg_rating,
            "reputation updated"
        );
    }

    /// Credit earnings released from escrow.
    pub fn record_earnings(&self, agent: &AgentId, amount: Decimal) {
        let mut records = self.records.write();
        let record = records
            .entry(agent.clone())
            .or_insert_with(|| AgentReputation::new(agent.clone()));
        record.credit_earnings(amount);
    }

    /// Agents whose composite score meets the threshold.
    pub fn get_trusted_agents(&self, min_score: Decimal) -> Vec<AgentId> {
        self.records
            .read()
            .values()
            .filter(|r| r.reputation_score() >= min_score)
            .map(|r| r.agent.clone())
            .collect()
    }

    /// Human-readable summary card for one agent.
    pub fn agent_card(&self, agent: &AgentId) -> String {
        let rep = self.get_or_create(agent);
        let score = rep.reputation_score();
        let verdict = if score >= DEFAULT_TRUST_THRESHOLD {
            "trusted"
        } else {
            "new or high-risk"
        };
        format!(
            "agent {agent}: score {score:.1}/100, success {:.1}%, rating {:.1}/5.0, \
             {} tasks, {:.4} earned ({verdict})",
            rep.success_rate() * rust_decimal_macros::dec!(100),
            rep.avg_rating,
            rep.total_tasks,
            rep.total_earnings,
        )
    }
}

impl Default for ReputationLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lazy_create() {
        let ledger = ReputationLedger::new();
        let agent = AgentId::new("solver_new");

        let rep = ledger.get_or_create(&agent);
        assert_eq!(rep.total_tasks, 0);
        assert_eq!(rep.avg_rating, dec!(4));

        // Second lookup returns the same record, not a fresh one.
        ledger.update(&agent, true, Some(dec!(5)));
        let rep = ledger.get_or_create(&agent);
        assert_eq!(rep.total_tasks, 1);
    }

    #[test]
    fn test_update_tallies() {
        let ledger = ReputationLedger::new();
        let agent = AgentId::new("solver_a");

        ledger.update(&agent, true, Some(dec!(5)));
        ledger.update(&agent, true, None);
        ledger.update(&agent, false, Some(dec!(1)));

        let rep = ledger.get_or_create(&agent);
        assert_eq!(rep.total_tasks, 3);
        assert_eq!(rep.completed_tasks, 2);
        assert_eq!(rep.failed_tasks, 1);
    }

    #[test]
    fn test_trusted_agents_threshold() {
        let ledger = ReputationLedger::new();
        let good = AgentId::new("solver_good");
        let bad = AgentId::new("solver_bad");

        ledger.update(&good, true, Some(dec!(5)));
        for _ in 0..10 {
            ledger.update(&bad, false, Some(dec!(0.5)));
        }

        let trusted = ledger.get_trusted_agents(DEFAULT_TRUST_THRESHOLD);
        assert!(trusted.contains(&good));
        assert!(!trusted.contains(&bad));
    }

    #[test]
    fn test_earnings_accumulate() {
        let ledger = ReputationLedger::new();
        let agent = AgentId::new("solver_a");

        ledger.record_earnings(&agent, dec!(0.3));
        ledger.record_earnings(&agent, dec!(0.45));

        assert_eq!(ledger.get_or_create(&agent).total_earnings, dec!(0.75));
    }

    #[test]
    fn test_agent_card_mentions_agent() {
        let ledger = ReputationLedger::new();
        let agent = AgentId::new("solver_a");
        let card = ledger.agent_card(&agent);
        assert!(card.contains("solver_a"));
        assert!(card.contains("trusted"));
    }
}
