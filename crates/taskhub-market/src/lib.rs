//! Taskhub Market - Matching Engine Core
//!
//! The market is the sole mutator of task and bid state. Buyers post
//! tasks, solver agents submit priced bids, and on an explicit trigger the
//! market selects the cheapest in-budget bid as the winner. Escrow and
//! reputation updates are explicit follow-up calls by the orchestrating
//! caller, never hidden side effects of matching.
//!
//! # Concurrency
//!
//! All task and bid state lives behind a single [`parking_lot::RwLock`], so
//! every operation is atomic end-to-end. In particular, `select_winner`'s
//! scan-then-commit cannot interleave with a concurrent `submit_bid` on the
//! same task; a bid that arrives after selection committed fails cleanly
//! against the now in-progress task.
//!
//! # Ordering
//!
//! Bids are kept in an ordered `Vec` per task. Price ties break to the
//! earliest submitted bid, which only stays reproducible because insertion
//! order is preserved.

use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use taskhub_types::{
    AgentId, Bid, MarketSnapshot, Result, Task, TaskId, TaskStatus, TaskhubError,
};

/// Expected-unit count at which task complexity saturates to 1.0.
const COMPLEXITY_SATURATION: u64 = 100_000;

/// Market-wide aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    /// All tasks ever posted
    pub total_tasks: usize,
    /// All bids ever submitted, winning or not
    pub total_bids: usize,
    /// Mean price of the assigned bid across tasks with a winner (zero
    /// when nothing has been assigned)
    pub avg_winning_bid: Decimal,
    /// Tasks still open for bidding
    pub active_tasks: usize,
}

struct MarketState {
    tasks: HashMap<TaskId, Task>,
    // Ordered append-only bid list per task; insertion order is the
    // tie-break contract.
    bids: HashMap<TaskId, Vec<Bid>>,
}

/// The task/bid matching engine
pub struct Market {
    state: RwLock<MarketState>,
}

impl Market {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MarketState {
                tasks: HashMap::new(),
                bids: HashMap::new(),
            }),
        }
    }

    /// Post a new task. The task opens for bidding immediately.
    pub fn create_task(
        &self,
        description: impl Into<String>,
        input_ref: impl Into<String>,
        max_budget: Decimal,
        expected_units: u64,
        requester: AgentId,
    ) -> Result<Task> {
        if max_budget <= Decimal::ZERO {
            return Err(TaskhubError::invalid_input(format!(
                "max_budget must be positive, got {max_budget}"
            )));
        }

        let task = Task::new(requester, description, input_ref, max_budget, expected_units);

        let mut state = self.state.write();
        state.bids.insert(task.id, Vec::new());
        state.tasks.insert(task.id, task.clone());

        info!(task_id = %task.id, %max_budget, "task posted");
        Ok(task)
    }

    /// Submit a bid against an open task. Bids against non-open tasks are
    /// rejected outright; prices above the task budget are accepted here
    /// and excluded at selection time instead.
    pub fn submit_bid(
        &self,
        task_id: TaskId,
        bidder: AgentId,
        price: Decimal,
        estimated_units: u64,
        model: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Bid> {
        if price <= Decimal::ZERO {
            return Err(TaskhubError::invalid_input(format!(
                "bid price must be positive, got {price}"
            )));
        }

        let mut state = self.state.write();

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| TaskhubError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        if !task.status.is_open() {
            return Err(TaskhubError::InvalidState {
                entity: "task",
                id: task_id.to_string(),
                state: task.status.to_string(),
                operation: "submit_bid",
            });
        }

        let bid = Bid::new(task_id, bidder, price, estimated_units, model, message);
        info!(bid_id = %bid.id, %task_id, bidder = %bid.bidder, %price, "bid received");

        state.bids.entry(task_id).or_default().push(bid.clone());
        Ok(bid)
    }

    /// Select the winning bid for an open task: the minimum-priced bid at
    /// or under budget, ties to the earliest submitted. Returns `Ok(None)`
    /// and leaves the task open when no bid qualifies (a match failure, not
    /// a system error). On success the task moves to in-progress and
    /// records its assignee; re-invocation then fails.
    pub fn select_winner(&self, task_id: TaskId) -> Result<Option<Bid>> {
        let mut state = self.state.write();

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| TaskhubError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        if !task.status.is_open() {
            return Err(TaskhubError::InvalidState {
                entity: "task",
                id: task_id.to_string(),
                state: task.status.to_string(),
                operation: "select_winner",
            });
        }

        let max_budget = task.max_budget;

        // Decision: stable scan keeps the earliest bid on price ties. The
        // strict `<` is what makes the tie-break deterministic.
        let mut winner: Option<Bid> = None;
        if let Some(bids) = state.bids.get(&task_id) {
            for bid in bids {
                if bid.price > max_budget {
                    continue;
                }
                match &winner {
                    Some(best) if bid.price >= best.price => {}
                    _ => winner = Some(bid.clone()),
                }
            }
        }

        let Some(winner) = winner else {
            warn!(%task_id, %max_budget, "no valid bid within budget");
            return Ok(None);
        };

        // Commit: same write lock as the scan, so no bid can slip between
        // decision and mutation.
        let task = state.tasks.get_mut(&task_id).expect("task checked above");
        task.assigned_to = Some(winner.bidder.clone());
        task.status = TaskStatus::InProgress;

        info!(%task_id, winner = %winner.bidder, price = %winner.price, "winner selected");
        Ok(Some(winner))
    }

    /// Record the task result: `InProgress -> Completed`. Escrow and
    /// reputation are deliberately not touched here; the caller drives
    /// those so partial settlement failures stay observable and retryable.
    pub fn complete_task(&self, task_id: TaskId, result: impl Into<String>) -> Result<()> {
        let mut state = self.state.write();

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| TaskhubError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        if task.status != TaskStatus::InProgress {
            return Err(TaskhubError::InvalidState {
                entity: "task",
                id: task_id.to_string(),
                state: task.status.to_string(),
                operation: "complete_task",
            });
        }

        task.result = Some(result.into());
        task.status = TaskStatus::Completed;

        info!(%task_id, "task completed");
        Ok(())
    }

    /// Mark a task failed, either from in-progress (execution failed) or
    /// from open (abandoned with no valid bid).
    pub fn fail_task(&self, task_id: TaskId) -> Result<()> {
        let mut state = self.state.write();

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| TaskhubError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        if task.status.is_final() {
            return Err(TaskhubError::InvalidState {
                entity: "task",
                id: task_id.to_string(),
                state: task.status.to_string(),
                operation: "fail_task",
            });
        }

        task.status = TaskStatus::Failed;
        warn!(%task_id, "task failed");
        Ok(())
    }

    /// Snapshot of one task, if it exists.
    pub fn get_task(&self, task_id: TaskId) -> Option<Task> {
        self.state.read().tasks.get(&task_id).cloned()
    }

    /// All tasks currently open for bidding.
    pub fn open_tasks(&self) -> Vec<Task> {
        self.state
            .read()
            .tasks
            .values()
            .filter(|t| t.status.is_open())
            .cloned()
            .collect()
    }

    /// Bids for a task in submission order, losing bids included.
    pub fn bids(&self, task_id: TaskId) -> Result<Vec<Bid>> {
        let state = self.state.read();
        if !state.tasks.contains_key(&task_id) {
            return Err(TaskhubError::TaskNotFound {
                task_id: task_id.to_string(),
            });
        }
        Ok(state.bids.get(&task_id).cloned().unwrap_or_default())
    }

    /// Point-in-time view of bidding conditions on a task, for strategies.
    pub fn snapshot(&self, task_id: TaskId) -> Result<MarketSnapshot> {
        let state = self.state.read();

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| TaskhubError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        let complexity = Decimal::from(task.expected_units.min(COMPLEXITY_SATURATION))
            / Decimal::from(COMPLEXITY_SATURATION);

        let bids = state.bids.get(&task_id).map(Vec::as_slice).unwrap_or(&[]);
        if bids.is_empty() {
            return Ok(MarketSnapshot::empty(complexity));
        }

        let mut min = bids[0].price;
        let mut max = bids[0].price;
        let mut sum = Decimal::ZERO;
        for bid in bids {
            min = min.min(bid.price);
            max = max.max(bid.price);
            sum += bid.price;
        }

        Ok(MarketSnapshot {
            avg_price: sum / Decimal::from(bids.len() as u64),
            min_price: min,
            max_price: max,
            total_bids: bids.len(),
            task_complexity: complexity,
        })
    }

    /// Market-wide aggregates.
    pub fn stats(&self) -> MarketStats {
        let state = self.state.read();

        let total_bids = state.bids.values().map(Vec::len).sum();

        let mut winning_sum = Decimal::ZERO;
        let mut winning_count = 0u64;
        for task in state.tasks.values() {
            let Some(assignee) = &task.assigned_to else {
                continue;
            };
            let assigned_bid = state
                .bids
                .get(&task.id)
                .and_then(|bids| bids.iter().find(|b| &b.bidder == assignee));
            if let Some(bid) = assigned_bid {
                winning_sum += bid.price;
                winning_count += 1;
            }
        }

        MarketStats {
            total_tasks: state.tasks.len(),
            total_bids,
            avg_winning_bid: if winning_count == 0 {
                Decimal::ZERO
            } else {
                winning_sum / Decimal::from(winning_count)
            },
            active_tasks: state.tasks.values().filter(|t| t.status.is_open()).count(),
        }
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}
