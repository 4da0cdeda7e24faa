//! Error types for Taskhub
//!
//! All core errors are local, synchronous, and surfaced immediately to the
//! caller. None of them represent transient conditions, so nothing here is
//! ever retried internally.

use thiserror::Error;

/// Result type for taskhub operations
pub type Result<T> = std::result::Result<T, TaskhubError>;

/// Taskhub error taxonomy
#[derive(Debug, Clone, Error)]
pub enum TaskhubError {
    /// Referenced task does not exist
    #[error("Task {task_id} not found")]
    TaskNotFound { task_id: String },

    /// Referenced escrow does not exist
    #[error("Escrow {escrow_id} not found")]
    EscrowNotFound { escrow_id: String },

    /// Operation attempted against an entity whose status forbids it
    /// (re-selecting a winner, re-funding an escrow, resolving a terminal
    /// escrow, bidding on a non-open task)
    #[error("{entity} {id} is {state}: cannot {operation}")]
    InvalidState {
        entity: &'static str,
        id: String,
        state: String,
        operation: &'static str,
    },

    /// Non-positive budget, price, or amount
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl TaskhubError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
