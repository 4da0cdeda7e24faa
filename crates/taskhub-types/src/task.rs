//! Tasks and bids
//!
//! A [`Task`] is a unit of work a buyer wants performed, with a budget
//! ceiling. A [`Bid`] is a seller's priced offer against one task. Both are
//! owned and mutated exclusively by the market; agents only ever see
//! snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::AgentId;

// ============================================================================
// ID Types
// ============================================================================

/// Task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bid identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BidId(pub Uuid);

impl BidId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BidId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Task
// ============================================================================

/// Task lifecycle status
///
/// Transitions only ever move forward:
/// `Open -> InProgress -> {Completed | Failed}`, with `Open -> Failed`
/// reachable when a task is abandoned without a valid bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepting bids
    Open,
    /// Winner selected, work underway
    InProgress,
    /// Result delivered
    Completed,
    /// Abandoned or unsuccessful
    Failed,
}

impl TaskStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Open)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "open"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A unit of work posted by a buyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Task ID
    pub id: TaskId,
    /// Agent that posted the task
    pub requester: AgentId,
    /// Human-readable description
    pub description: String,
    /// Opaque input reference (URL, path, or inline text)
    pub input_ref: String,
    /// Budget ceiling; bids above this are never selected
    pub max_budget: Decimal,
    /// Expected cost-unit count (token-count analogue), used by strategies
    pub expected_units: u64,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// Winning bidder, set when a winner is selected
    pub assigned_to: Option<AgentId>,
    /// Result payload, set on completion
    pub result: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        requester: AgentId,
        description: impl Into<String>,
        input_ref: impl Into<String>,
        max_budget: Decimal,
        expected_units: u64,
    ) -> Self {
        Self {
            id: TaskId::new(),
            requester,
            description: description.into(),
            input_ref: input_ref.into(),
            max_budget,
            expected_units,
            status: TaskStatus::Open,
            assigned_to: None,
            result: None,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Bid
// ============================================================================

/// A seller's priced offer against one task
///
/// Bids are immutable once submitted and are retained even when they lose,
/// for statistics and audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    /// Bid ID
    pub id: BidId,
    /// Task this bid targets
    pub task_id: TaskId,
    /// Bidding agent
    pub bidder: AgentId,
    /// Offered price
    pub price: Decimal,
    /// Bidder's own cost-unit estimate
    pub estimated_units: u64,
    /// Declared model or strategy label
    pub model: String,
    /// Free-text pitch
    pub message: String,
    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,
}

impl Bid {
    pub fn new(
        task_id: TaskId,
        bidder: AgentId,
        price: Decimal,
        estimated_units: u64,
        model: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: BidId::new(),
            task_id,
            bidder,
            price,
            estimated_units,
            model: model.into(),
            message: message.into(),
            submitted_at: Utc::now(),
        }
    }
}
