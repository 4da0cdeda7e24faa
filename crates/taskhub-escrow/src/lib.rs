//! Taskhub Escrow - Custodial Ledger for Task Settlement
//!
//! The escrow ledger is the authoritative record of whether funds for a
//! settled task are locked, released, or returned. It models bookkeeping
//! only: an external wallet/chain collaborator performs the real transfer
//! and must call [`EscrowLedger::fund`] / [`EscrowLedger::resolve`] only
//! after its own operation durably succeeds, so this ledger is always a
//! (possibly lagging but eventually consistent) mirror of real custody.
//!
//! # Invariants
//!
//! 1. An escrow's amount never changes after creation
//! 2. Status transitions are one-directional; no state is revisited
//! 3. Total value locked equals the sum of amounts in locked states
//! 4. Re-funding a funded escrow is rejected, never silently repeated

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use taskhub_types::{AgentId, EscrowAccount, EscrowId, EscrowStatus, Result, TaskId, TaskhubError};

/// Ledger-wide aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowStats {
    /// All escrows ever created, including terminal ones
    pub total_escrows: usize,
    /// Sum of amounts across escrows in a locked state
    pub total_value_locked: Decimal,
    /// Escrows currently in a locked state
    pub active_escrows: usize,
}

struct LedgerState {
    escrows: HashMap<EscrowId, EscrowAccount>,
    total_value_locked: Decimal,
}

/// In-memory escrow ledger
///
/// All operations are atomic under one write lock; the locked-value counter
/// can never drift from the escrow map it summarizes.
pub struct EscrowLedger {
    state: RwLock<LedgerState>,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState {
                escrows: HashMap::new(),
                total_value_locked: Decimal::ZERO,
            }),
        }
    }

    /// Create an escrow record for a task/winner pair. Funds are not yet
    /// considered locked.
    pub fn create(
        &self,
        task_id: TaskId,
        buyer: AgentId,
        seller: AgentId,
        amount: Decimal,
    ) -> Result<EscrowId> {
        if amount <= Decimal::ZERO {
            return Err(TaskhubError::invalid_input(format!(
                "escrow amount must be positive, got {amount}"
            )));
        }

        let escrow = EscrowAccount::new(task_id, buyer, seller, amount);
        let escrow_id = escrow.id;

        let mut state = self.state.write();
        state.escrows.insert(escrow_id, escrow);

        info!(%escrow_id, %task_id, %amount, "escrow created");
        Ok(escrow_id)
    }

    /// Mark the buyer's funds as locked: `Created -> Funded`.
    pub fn fund(&self, escrow_id: EscrowId) -> Result<()> {
        let mut state = self.state.write();

        let escrow = state
            .escrows
            .get_mut(&escrow_id)
            .ok_or_else(|| TaskhubError::EscrowNotFound {
                escrow_id: escrow_id.to_string(),
            })?;

        if escrow.status != EscrowStatus::Created {
            warn!(%escrow_id, status = %escrow.status, "rejected fund attempt");
            return Err(TaskhubError::InvalidState {
                entity: "escrow",
                id: escrow_id.to_string(),
                state: escrow.status.to_string(),
                operation: "fund",
            });
        }

        escrow.status = EscrowStatus::Funded;
        let amount = escrow.amount;
        state.total_value_locked += amount;

        info!(%escrow_id, %amount, "escrow funded");
        Ok(())
    }

    /// Resolve a funded escrow: release to the seller when approved,
    /// return to the buyer otherwise. Both outcomes are terminal and unlock
    /// the amount.
    pub fn resolve(&self, escrow_id: EscrowId, approved: bool) -> Result<()> {
        let mut state = self.state.write();

        let escrow = state
            .escrows
            .get_mut(&escrow_id)
            .ok_or_else(|| TaskhubError::EscrowNotFound {
                escrow_id: escrow_id.to_string(),
            })?;

        if !escrow.status.is_locked() {
            warn!(%escrow_id, status = %escrow.status, "rejected resolve attempt");
            return Err(TaskhubError::InvalidState {
                entity: "escrow",
                id: escrow_id.to_string(),
                state: escrow.status.to_string(),
                operation: "resolve",
            });
        }

        let amount = escrow.amount;
        if approved {
            escrow.status = EscrowStatus::Completed;
            escrow.completed_at = Some(Utc::now());
            info!(%escrow_id, %amount, seller = %escrow.seller, "escrow released to seller");
        } else {
            escrow.status = EscrowStatus::Cancelled;
            info!(%escrow_id, %amount, buyer = %escrow.buyer, "escrow returned to buyer");
        }
        state.total_value_locked -= amount;

        Ok(())
    }

    /// Snapshot of one escrow, if it exists.
    pub fn get(&self, escrow_id: EscrowId) -> Option<EscrowAccount> {
        self.state.read().escrows.get(&escrow_id).cloned()
    }

    /// Ledger-wide aggregates.
    pub fn stats(&self) -> EscrowStats {
        let state = self.state.read();
        EscrowStats {
            total_escrows: state.escrows.len(),
            total_value_locked: state.total_value_locked,
            active_escrows: state
                .escrows
                .values()
                .filter(|e| e.status.is_locked())
                .count(),
        }
    }
}

impl Default for EscrowLedger {
    fn default() -> Self {
        Self::new()
    }
}
