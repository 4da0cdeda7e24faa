//! Taskhub Settlement - End-to-End Match and Payout Orchestration
//!
//! Settlement spans three components with no internal transaction: the
//! market (winner selection, task status), the escrow ledger (fund custody),
//! and the reputation ledger (trust accrual). This engine drives the steps
//! in order and logs each one, so a failure between steps leaves an
//! observable intermediate state that a reconciliation pass can detect —
//! best-effort with observable intermediate states, not atomicity across
//! components.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use taskhub_escrow::EscrowLedger;
use taskhub_market::Market;
use taskhub_reputation::ReputationLedger;
use taskhub_types::{AgentId, EscrowId, Result, TaskId, TaskhubError};

/// Record of an assignment: winner selected, escrow created and funded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub task_id: TaskId,
    pub escrow_id: EscrowId,
    pub buyer: AgentId,
    pub winner: AgentId,
    pub price: Decimal,
}

/// Drives matching outcomes through escrow and reputation
pub struct SettlementEngine {
    market: Arc<Market>,
    escrow: Arc<EscrowLedger>,
    reputation: Arc<ReputationLedger>,
}

impl SettlementEngine {
    pub fn new(
        market: Arc<Market>,
        escrow: Arc<EscrowLedger>,
        reputation: Arc<ReputationLedger>,
    ) -> Self {
        Self {
            market,
            escrow,
            reputation,
        }
    }

    pub fn market(&self) -> &Arc<Market> {
        &self.market
    }

    pub fn escrow(&self) -> &Arc<EscrowLedger> {
        &self.escrow
    }

    pub fn reputation(&self) -> &Arc<ReputationLedger> {
        &self.reputation
    }

    /// Select a winner for the task and lock the buyer's funds:
    /// winner selection, escrow creation, escrow funding, in that order.
    /// Returns `Ok(None)` when no bid qualifies (the task stays open).
    pub fn assign(&self, task_id: TaskId) -> Result<Option<Settlement>> {
        let Some(winner) = self.market.select_winner(task_id)? else {
            return Ok(None);
        };

        // select_winner succeeded, so the task exists.
        let task = self
            .market
            .get_task(task_id)
            .ok_or_else(|| TaskhubError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        let escrow_id = self.escrow.create(
            task_id,
            task.requester.clone(),
            winner.bidder.clone(),
            winner.price,
        )?;
        self.escrow.fund(escrow_id)?;

        info!(
            %task_id,
            %escrow_id,
            winner = %winner.bidder,
            price = %winner.price,
            "task assigned and escrow funded"
        );

        Ok(Some(Settlement {
            task_id,
            escrow_id,
            buyer: task.requester,
            winner: winner.bidder,
            price: winner.price,
        }))
    }

    /// Resolve an assigned task. On approval the task completes, the
    /// escrow releases to the winner, and the winner's reputation and
    /// earnings are credited; otherwise the task fails, the escrow returns
    /// to the buyer, and the failure is recorded. The optional rating
    /// feeds the winner's rolling rating window either way.
    pub fn settle(
        &self,
        settlement: &Settlement,
        result: impl Into<String>,
        approved: bool,
        rating: Option<Decimal>,
    ) -> Result<()> {
        if approved {
            self.market.complete_task(settlement.task_id, result)?;
        } else {
            self.market.fail_task(settlement.task_id)?;
            warn!(task_id = %settlement.task_id, winner = %settlement.winner, "settlement rejected");
        }

        self.escrow.resolve(settlement.escrow_id, approved)?;

        self.reputation
            .update(&settlement.winner, approved, rating);
        if approved {
            self.reputation
                .record_earnings(&settlement.winner, settlement.price);
        }

        info!(
            task_id = %settlement.task_id,
            escrow_id = %settlement.escrow_id,
            approved,
            "settlement finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use taskhub_solver::diverse_solvers;
    use taskhub_types::{EscrowStatus, TaskStatus};

    fn engine() -> SettlementEngine {
        SettlementEngine::new(
            Arc::new(Market::new()),
            Arc::new(EscrowLedger::new()),
            Arc::new(ReputationLedger::new()),
        )
    }

    #[test]
    fn test_assign_and_settle_success() {
        let engine = engine();
        let market = engine.market().clone();

        let task = market
            .create_task("summarize a paper", "https://example.com/p.pdf", dec!(3.0), 50_000, AgentId::new("buyer_001"))
            .unwrap();
        for (bidder, price) in [("solver_a", dec!(0.5)), ("solver_b", dec!(0.3)), ("solver_c", dec!(0.7))] {
            market
                .submit_bid(task.id, AgentId::new(bidder), price, 50_000, "m", "")
                .unwrap();
        }

        let settlement = engine.assign(task.id).unwrap().unwrap();
        assert_eq!(settlement.winner, AgentId::new("solver_b"));
        assert_eq!(settlement.price, dec!(0.3));
        assert_eq!(engine.escrow().stats().total_value_locked, dec!(0.3));
        assert_eq!(
            market.get_task(task.id).unwrap().status,
            TaskStatus::InProgress
        );

        engine
            .settle(&settlement, "summary text", true, Some(dec!(5)))
            .unwrap();

        assert_eq!(
            market.get_task(task.id).unwrap().status,
            TaskStatus::Completed
        );
        assert_eq!(engine.escrow().stats().total_value_locked, dec!(0));
        assert_eq!(
            engine.escrow().get(settlement.escrow_id).unwrap().status,
            EscrowStatus::Completed
        );

        let rep = engine.reputation().get_or_create(&settlement.winner);
        assert_eq!(rep.completed_tasks, 1);
        assert_eq!(rep.total_earnings, dec!(0.3));
    }

    #[test]
    fn test_settle_rejection_refunds_buyer() {
        let engine = engine();
        let market = engine.market().clone();

        let task = market
            .create_task("t", "x", dec!(2.0), 10_000, AgentId::new("buyer_001"))
            .unwrap();
        market
            .submit_bid(task.id, AgentId::new("solver_a"), dec!(1.2), 10_000, "m", "")
            .unwrap();

        let settlement = engine.assign(task.id).unwrap().unwrap();
        engine.settle(&settlement, "", false, Some(dec!(1))).unwrap();

        assert_eq!(market.get_task(task.id).unwrap().status, TaskStatus::Failed);
        assert_eq!(
            engine.escrow().get(settlement.escrow_id).unwrap().status,
            EscrowStatus::Cancelled
        );
        assert_eq!(engine.escrow().stats().total_value_locked, dec!(0));

        let rep = engine.reputation().get_or_create(&settlement.winner);
        assert_eq!(rep.failed_tasks, 1);
        assert_eq!(rep.total_earnings, dec!(0));
    }

    #[test]
    fn test_assign_without_valid_bids() {
        let engine = engine();
        let market = engine.market().clone();

        let task = market
            .create_task("t", "x", dec!(1.0), 10_000, AgentId::new("buyer_001"))
            .unwrap();
        market
            .submit_bid(task.id, AgentId::new("solver_a"), dec!(1.5), 10_000, "m", "")
            .unwrap();

        assert!(engine.assign(task.id).unwrap().is_none());
        assert_eq!(market.get_task(task.id).unwrap().status, TaskStatus::Open);
        assert_eq!(engine.escrow().stats().total_escrows, 0);
    }

    #[test]
    fn test_double_assign_rejected() {
        let engine = engine();
        let market = engine.market().clone();

        let task = market
            .create_task("t", "x", dec!(2.0), 10_000, AgentId::new("buyer_001"))
            .unwrap();
        market
            .submit_bid(task.id, AgentId::new("solver_a"), dec!(1.0), 10_000, "m", "")
            .unwrap();

        engine.assign(task.id).unwrap().unwrap();
        assert!(matches!(
            engine.assign(task.id).unwrap_err(),
            TaskhubError::InvalidState { .. }
        ));
        // Only the first assignment locked funds.
        assert_eq!(engine.escrow().stats().total_value_locked, dec!(1.0));
    }

    #[test]
    fn test_double_settle_rejected() {
        let engine = engine();
        let market = engine.market().clone();

        let task = market
            .create_task("t", "x", dec!(2.0), 10_000, AgentId::new("buyer_001"))
            .unwrap();
        market
            .submit_bid(task.id, AgentId::new("solver_a"), dec!(1.0), 10_000, "m", "")
            .unwrap();

        let settlement = engine.assign(task.id).unwrap().unwrap();
        engine.settle(&settlement, "done", true, None).unwrap();

        assert!(matches!(
            engine.settle(&settlement, "again", true, None).unwrap_err(),
            TaskhubError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_full_marketplace_flow_with_solvers() {
        let engine = engine();
        let market = engine.market().clone();
        let solvers = diverse_solvers(market.clone());

        let task = market
            .create_task(
                "caption a product image",
                "https://example.com/shoe.png",
                dec!(3.0),
                50_000,
                AgentId::new("buyer_001"),
            )
            .unwrap();

        for solver in &solvers {
            solver.scan_and_bid();
        }
        let bids = market.bids(task.id).unwrap();
        assert!(!bids.is_empty());

        let settlement = engine.assign(task.id).unwrap().unwrap();
        // The cheapest in-budget bid wins.
        let min_price = bids.iter().map(|b| b.price).min().unwrap();
        assert_eq!(settlement.price, min_price);

        engine
            .settle(&settlement, "a red running shoe", true, Some(dec!(4.5)))
            .unwrap();

        let stats = market.stats();
        assert_eq!(stats.total_tasks, 1);
        assert_eq!(stats.active_tasks, 0);
        assert_eq!(stats.avg_winning_bid, min_price);

        let trusted = engine
            .reputation()
            .get_trusted_agents(taskhub_reputation::DEFAULT_TRUST_THRESHOLD);
        assert!(trusted.contains(&settlement.winner));
    }
}
