//! Taskhub Demo - Marketplace Simulation
//!
//! Runs the whole marketplace loop in-process: buyers post a round of
//! tasks, a diverse roster of solvers scans and bids, winners are assigned
//! with funds escrowed, and results are approved or rejected against each
//! solver's advertised success rate. Reputations accrue across rounds.
//!
//! The simulation is seeded, so a given seed replays the same history of
//! approvals and ratings.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use taskhub_escrow::EscrowLedger;
use taskhub_market::Market;
use taskhub_reputation::{ReputationLedger, DEFAULT_TRUST_THRESHOLD};
use taskhub_settlement::SettlementEngine;
use taskhub_solver::{diverse_solvers, SolverAgent};
use taskhub_types::{AgentId, Result};

/// Simulation output for inspection by the caller
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub tasks_posted: usize,
    pub tasks_assigned: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
    pub avg_winning_bid: Decimal,
    pub value_locked: Decimal,
    pub trusted_agents: Vec<AgentId>,
}

const TASK_CATALOG: [(&str, &str, u64); 5] = [
    ("caption a product image", "https://img.example.com/123.png", 40_000),
    ("summarize a research paper", "ipfs://QmPaper", 80_000),
    ("translate a support ticket", "ticket text inline", 12_000),
    ("extract a table from a receipt", "https://img.example.com/rcpt.jpg", 25_000),
    ("classify a code snippet", "fn main() {}", 6_000),
];

/// Run `rounds` rounds of the marketplace with the stock solver roster.
pub fn run_demo(seed: u64, rounds: usize) -> Result<DemoReport> {
    let market = Arc::new(Market::new());
    let escrow = Arc::new(EscrowLedger::new());
    let reputation = Arc::new(ReputationLedger::new());
    let engine = SettlementEngine::new(market.clone(), escrow.clone(), reputation.clone());
    let solvers: Vec<SolverAgent> = diverse_solvers(market.clone());

    let mut rng = StdRng::seed_from_u64(seed);
    let buyer = AgentId::new("buyer_001");

    let mut assigned = 0usize;
    let mut completed = 0usize;
    let mut failed = 0usize;

    for round in 0..rounds {
        let (description, input_ref, units) = TASK_CATALOG[round % TASK_CATALOG.len()];
        // Budgets jitter between 1.0 and 4.0 to vary which solvers clear
        // the feasibility margin.
        let budget = Decimal::from(rng.gen_range(10u32..=40)) / dec!(10);

        let task = market.create_task(description, input_ref, budget, units, buyer.clone())?;

        for solver in &solvers {
            solver.scan_and_bid();
        }

        let Some(settlement) = engine.assign(task.id)? else {
            market.fail_task(task.id)?;
            failed += 1;
            info!(round, task_id = %task.id, "no valid bid, task abandoned");
            continue;
        };
        assigned += 1;

        // Execution is off-band; emulate it with a 90% approval coin.
        let approved = rng.gen_bool(0.9);
        let rating = Decimal::from(rng.gen_range(30u32..=50)) / dec!(10);
        engine.settle(
            &settlement,
            format!("result for: {description}"),
            approved,
            Some(rating),
        )?;
        if approved {
            completed += 1;
        } else {
            failed += 1;
        }
    }

    let market_stats = market.stats();
    let escrow_stats = escrow.stats();
    info!(
        total_tasks = market_stats.total_tasks,
        total_bids = market_stats.total_bids,
        avg_winning_bid = %market_stats.avg_winning_bid,
        total_escrows = escrow_stats.total_escrows,
        value_locked = %escrow_stats.total_value_locked,
        "simulation finished"
    );
    for solver in &solvers {
        info!("{}", reputation.agent_card(solver.agent_id()));
    }

    Ok(DemoReport {
        tasks_posted: market_stats.total_tasks,
        tasks_assigned: assigned,
        tasks_completed: completed,
        tasks_failed: failed,
        avg_winning_bid: market_stats.avg_winning_bid,
        value_locked: escrow_stats.total_value_locked,
        trusted_agents: reputation.get_trusted_agents(DEFAULT_TRUST_THRESHOLD),
    })
}
