//! Escrow account types
//!
//! An [`EscrowAccount`] is a custodial hold of funds for exactly one
//! task/winner pair. The amount is fixed at creation and never changes;
//! only the status advances. The ledger that owns these records mirrors an
//! external custody collaborator and performs no real asset transfer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{AgentId, TaskId};

/// Escrow identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscrowId(pub Uuid);

impl EscrowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EscrowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EscrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Escrow lifecycle status
///
/// `Created -> Funded -> {Completed | Cancelled}`. `InProgress` and
/// `Disputed` are reserved extension states; the minimal settlement flow
/// never enters them but they must remain representable. No state is ever
/// revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// Record exists, no funds moved yet
    Created,
    /// Buyer's funds are locked
    Funded,
    /// Reserved: work underway with funds locked
    InProgress,
    /// Funds released to the seller (terminal)
    Completed,
    /// Reserved: resolution contested
    Disputed,
    /// Funds returned to the buyer (terminal)
    Cancelled,
}

impl EscrowStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, EscrowStatus::Completed | EscrowStatus::Cancelled)
    }

    /// Whether this escrow's amount counts toward total value locked
    pub fn is_locked(&self) -> bool {
        matches!(self, EscrowStatus::Funded | EscrowStatus::InProgress)
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscrowStatus::Created => write!(f, "created"),
            EscrowStatus::Funded => write!(f, "funded"),
            EscrowStatus::InProgress => write!(f, "in_progress"),
            EscrowStatus::Completed => write!(f, "completed"),
            EscrowStatus::Disputed => write!(f, "disputed"),
            EscrowStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A custodial hold of funds for one settled task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowAccount {
    /// Escrow ID
    pub id: EscrowId,
    /// Task being settled
    pub task_id: TaskId,
    /// Paying agent
    pub buyer: AgentId,
    /// Receiving agent
    pub seller: AgentId,
    /// Held amount, immutable after creation
    pub amount: Decimal,
    /// Current lifecycle status
    pub status: EscrowStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Set when the escrow reaches `Completed`
    pub completed_at: Option<DateTime<Utc>>,
}

impl EscrowAccount {
    pub fn new(task_id: TaskId, buyer: AgentId, seller: AgentId, amount: Decimal) -> Self {
        Self {
            id: EscrowId::new(),
            task_id,
            buyer,
            seller,
            amount,
            status: EscrowStatus::Created,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}
