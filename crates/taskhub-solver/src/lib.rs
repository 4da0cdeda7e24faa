//! Taskhub Solver - Bidding Agents
//!
//! A solver agent is a decision-making market participant: it polls the
//! market for open tasks, evaluates feasibility against its own cost model,
//! prices eligible tasks through its configured strategy, and submits bids.
//!
//! The scan loop is pull-based with no freshness guarantee. A solver may
//! bid on a task that was assigned to someone else a moment earlier; the
//! market rejects that bid cleanly and the scan moves on.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use taskhub_market::Market;
use taskhub_strategy::Strategy;
use taskhub_types::{AgentId, Bid, Task, TaskhubError};

/// Margin kept against the budget ceiling when judging feasibility.
const BUDGET_SAFETY: Decimal = dec!(0.9);

/// Static solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Agent identity
    pub agent: AgentId,
    /// Declared model label, attached to every bid
    pub model: String,
    /// Marginal cost per expected unit of work
    pub cost_per_unit: Decimal,
    /// Self-assessed success rate on [0, 1], advertised only
    pub success_rate: f64,
    /// Domains this solver claims to be good at
    pub specializations: Vec<String>,
}

/// A market participant that scans, evaluates, and bids
pub struct SolverAgent {
    config: SolverConfig,
    strategy: Strategy,
    market: Arc<Market>,
}

impl SolverAgent {
    pub fn new(config: SolverConfig, strategy: Strategy, market: Arc<Market>) -> Self {
        info!(
            agent = %config.agent,
            model = %config.model,
            cost_per_unit = %config.cost_per_unit,
            %strategy,
            "solver started"
        );
        Self {
            config,
            strategy,
            market,
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.config.agent
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Expected cost of performing a task, per this solver's cost model.
    pub fn cost_basis(&self, task: &Task) -> Decimal {
        Decimal::from(task.expected_units) * self.config.cost_per_unit
    }

    /// Whether the task is worth bidding on: the cost basis must sit under
    /// the budget with a 10% safety margin, otherwise any profitable price
    /// would crowd the ceiling.
    pub fn evaluate(&self, task: &Task) -> bool {
        self.cost_basis(task) < task.max_budget * BUDGET_SAFETY
    }

    /// One polling pass: bid on every eligible open task. Returns the bids
    /// that were accepted. Tasks assigned concurrently mid-scan are skipped.
    pub fn scan_and_bid(&self) -> Vec<Bid> {
        let mut submitted = Vec::new();

        for task in self.market.open_tasks() {
            if !self.evaluate(&task) {
                debug!(agent = %self.config.agent, task_id = %task.id, "task not feasible");
                continue;
            }

            let Ok(snapshot) = self.market.snapshot(task.id) else {
                continue;
            };

            let cost = self.cost_basis(&task);
            let price = self
                .strategy
                .calculate_bid(cost, &snapshot, task.max_budget);
            if price > task.max_budget {
                debug!(agent = %self.config.agent, task_id = %task.id, %price, "priced out");
                continue;
            }

            match self.market.submit_bid(
                task.id,
                self.config.agent.clone(),
                price,
                task.expected_units,
                self.config.model.clone(),
                format!("{} can handle this efficiently", self.config.model),
            ) {
                Ok(bid) => {
                    info!(
                        agent = %self.config.agent,
                        task_id = %task.id,
                        %price,
                        %cost,
                        "bid placed"
                    );
                    submitted.push(bid);
                }
                // Lost the polling race: the task closed between the scan
                // snapshot and our submission.
                Err(TaskhubError::InvalidState { .. }) => continue,
                Err(_) => continue,
            }
        }

        submitted
    }
}

/// A roster of solvers across cost/quality tiers, to simulate a realistic
/// market population.
pub fn diverse_solvers(market: Arc<Market>) -> Vec<SolverAgent> {
    let roster = [
        // Cheap small model, fights for volume
        ("solver_qwen_tiny", "Qwen-1.5B", dec!(0.0000001), 0.70, Strategy::Aggressive),
        // Mid-tier generalist
        ("solver_llama_mid", "Llama-3-8B", dec!(0.0000005), 0.85, Strategy::MarketFollow),
        // Large model, prices by competition
        ("solver_qwen_large", "Qwen-32B", dec!(0.000001), 0.95, Strategy::Sniper),
        // Expensive expert, holds its margin
        ("solver_expert", "Mixtral-8x22B", dec!(0.000002), 0.98, Strategy::Conservative),
    ];

    roster
        .into_iter()
        .map(|(agent, model, cost_per_unit, success_rate, strategy)| {
            SolverAgent::new(
                SolverConfig {
                    agent: AgentId::new(agent),
                    model: model.to_string(),
                    cost_per_unit,
                    success_rate,
                    specializations: vec!["general".to_string()],
                },
                strategy,
                market.clone(),
            )
        })
        .collect()
}
